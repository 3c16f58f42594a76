use serde::{Deserialize, Serialize};
use sqlchain::{op, record, table, Writable};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize)]
struct User {
    id: i64,
    user_name: String,
    email: String,
    age: i32,
}

record!(User {
    id,
    user_name as "name",
    email,
    age,
});

fn main() -> sqlchain::Result<()> {
    // SELECT with placeholders
    let (sql, params) = table("users")
        .fields(["id", "name", "email"])
        .where_(("age", op::GT, 18))
        .where_(("status", "active"))
        .where_in("city", vec!["Paris", "Lyon"])
        .order_by("id desc")
        .limit_offset(20, 10)
        .build_select()?;
    println!("SELECT SQL: {sql}");
    println!("  params: {params:?}");

    // COUNT with a join
    let (sql, _) = table("users")
        .alias("u")
        .left_join("orders", "u.id = B.user_id")
        .where_raw("B.total > 100")
        .build_count()?;
    println!("COUNT SQL: {sql}");

    // INSERT from a record; the primary key is left to the database
    let user = User {
        id: 0,
        user_name: "O'Brien".to_string(),
        email: "ob@example.com".to_string(),
        age: 30,
    };
    let sql = table("users").build_insert(&Writable::record(&user)?)?;
    println!("INSERT SQL: {sql}");

    // UPDATE from a mapping
    let mut changes = HashMap::new();
    changes.insert("email", "new@example.com");
    let sql = table("users")
        .id(7)
        .build_update(&Writable::mapping(changes))?;
    println!("UPDATE SQL: {sql}");

    // DELETE by a list of ids
    let sql = table("users").id(vec![1, 2, 3]).build_delete()?;
    println!("DELETE SQL: {sql}");

    Ok(())
}
