//! SELECT and COUNT rendering

use super::statement::Statement;
use crate::{Result, Value};

impl Statement {
    fn select_list(&self) -> String {
        if let Some(distinct) = &self.distinct {
            return distinct.clone();
        }
        if self.fields.is_empty() {
            "*".to_string()
        } else {
            self.fields.join(",")
        }
    }

    /// `<table>[ as alias]<join>`
    ///
    /// # Panics
    /// Panics when a join is present without an alias.
    fn from_clause(&self) -> Result<String> {
        let table = self.require_table()?;
        let join = self.join.as_deref().unwrap_or("");
        if !join.is_empty() && self.alias.is_empty() {
            tracing::error!(target: "sqlchain::builder", table, "alias is empty");
            panic!("{table} alias is empty");
        }
        if self.alias.is_empty() {
            Ok(format!("{table}{join}"))
        } else {
            Ok(format!("{table} as {}{join}", self.alias))
        }
    }

    /// `[ where ..][ group by ..][ order by ..]` and the bound values
    fn tail_clauses(&self) -> (String, Vec<Value>) {
        let (condition, params) = self.predicates.render_parameterized();
        let mut tail = String::new();
        if !condition.is_empty() {
            tail.push_str(" where ");
            tail.push_str(&condition);
        }
        if let Some(group_by) = &self.group_by {
            tail.push_str(" group by ");
            tail.push_str(group_by);
        }
        if let Some(order_by) = &self.order_by {
            tail.push_str(" order by ");
            tail.push_str(order_by);
        }
        (tail, params)
    }

    fn limit_clause(&self) -> String {
        self.limit
            .as_deref()
            .map(|limit| format!(" {limit}"))
            .unwrap_or_default()
    }

    /// Render a parameterized SELECT
    pub fn build_select(&self) -> Result<(String, Vec<Value>)> {
        let from = self.from_clause()?;
        let (tail, params) = self.tail_clauses();
        let sql = format!("select {} from {from}{tail}{}", self.select_list(), self.limit_clause());
        Ok((sql, params))
    }

    /// Render a SELECT ending in `limit ?`; the caller binds the row count
    pub fn build_select_single(&self) -> Result<(String, Vec<Value>)> {
        let from = self.from_clause()?;
        let (tail, params) = self.tail_clauses();
        let sql = format!("select {} from {from}{tail} limit ?", self.select_list());
        Ok((sql, params))
    }

    /// Render `select count(..) as aggregate`
    pub fn build_count(&self) -> Result<(String, Vec<Value>)> {
        let from = self.from_clause()?;
        let (tail, params) = self.tail_clauses();
        let counted = self.distinct.as_deref().unwrap_or("*");
        let sql = format!(
            "select count({counted}) as aggregate from {from}{tail}{}",
            self.limit_clause()
        );
        Ok((sql, params))
    }
}

#[cfg(test)]
mod tests {
    use crate::{op, Error, Statement, Value};

    #[test]
    fn test_basic_select() {
        let (sql, params) = Statement::new().table("users").build_select().unwrap();
        assert_eq!(sql, "select * from users");
        assert!(params.is_empty());
    }

    #[test]
    fn test_select_with_predicate_and_limit() {
        let (sql, params) = Statement::new()
            .table("users")
            .where_(("age", op::GT, 18))
            .limit(10)
            .build_select()
            .unwrap();
        assert_eq!(sql, "select * from users where age > ? limit 10");
        assert_eq!(params, vec![Value::Int(18)]);
    }

    #[test]
    fn test_select_full_shape() {
        let (sql, params) = Statement::new()
            .table("users")
            .fields(["A.id", "B.total"])
            .left_join("orders", "A.id = B.user_id")
            .where_(("A.status", 1))
            .where_in("B.kind", vec!["x", "y"])
            .where_raw("B.total > 0")
            .group_by("A.id")
            .order_by("A.id DESC")
            .limit_offset(5, 10)
            .build_select()
            .unwrap();
        assert_eq!(
            sql,
            "select A.id,B.total from users as A left join orders as B on A.id = B.user_id \
             where A.status = ? and B.kind in (?,?) and B.total > 0 \
             group by A.id order by A.id DESC limit 5,10"
        );
        assert_eq!(params, vec![Value::Int(1), Value::from("x"), Value::from("y")]);
    }

    #[test]
    fn test_empty_values_leave_no_where() {
        let plain = Statement::new().table("users").build_select().unwrap();
        let skipped = Statement::new()
            .table("users")
            .where_(("name", ""))
            .where_in("id", Vec::<i64>::new())
            .build_select()
            .unwrap();
        assert_eq!(plain, skipped);
    }

    #[test]
    fn test_distinct_select() {
        let (sql, _) = Statement::new()
            .table("users")
            .fields("id")
            .distinct("city")
            .build_select()
            .unwrap();
        assert_eq!(sql, "select distinct city from users");
    }

    #[test]
    fn test_single_row_select() {
        let (sql, params) = Statement::new()
            .table("users")
            .where_(("id", 3))
            .order_by("id")
            .limit(50)
            .build_select_single()
            .unwrap();
        assert_eq!(sql, "select * from users where id = ? order by id limit ?");
        assert_eq!(params, vec![Value::Int(3)]);
    }

    #[test]
    fn test_count() {
        let (sql, params) = Statement::new()
            .table("users")
            .where_(("age", ">=", 21))
            .build_count()
            .unwrap();
        assert_eq!(sql, "select count(*) as aggregate from users where age >= ?");
        assert_eq!(params, vec![Value::Int(21)]);

        let (sql, _) = Statement::new()
            .table("users")
            .alias("U")
            .distinct("U.city")
            .build_count()
            .unwrap();
        assert_eq!(sql, "select count(distinct U.city) as aggregate from users as U");
    }

    #[test]
    fn test_missing_table() {
        let err = Statement::new().where_(("id", 1)).build_select().unwrap_err();
        assert!(matches!(err, Error::MissingTableName));
        assert!(matches!(
            Statement::new().build_count(),
            Err(Error::MissingTableName)
        ));
    }

    #[test]
    #[should_panic(expected = "users alias is empty")]
    fn test_join_without_alias_panics() {
        let mut statement = Statement::new().table("users").join("orders", "A.id = B.user_id");
        statement.alias.clear();
        let _ = statement.build_select();
    }

    #[test]
    fn test_caller_case_is_preserved() {
        let (sql, _) = Statement::new()
            .table("Users")
            .where_raw("Name = 'Bob'")
            .build_select()
            .unwrap();
        assert_eq!(sql, "select * from Users where Name = 'Bob'");
    }
}
