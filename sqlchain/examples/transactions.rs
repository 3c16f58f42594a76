use serde::{Deserialize, Serialize};
use sqlchain::{op, record, ConnectOptions, Db};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Serialize, Deserialize)]
struct Account {
    id: i64,
    owner: String,
    balance: i64,
}

record!(Account { id, owner, balance });

#[tokio::main]
async fn main() -> sqlchain::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sqlchain=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = ConnectOptions::new()
        .user("root")
        .database("bank")
        .debug(true);
    let db = Db::connect(&options).await?;

    let mut session = db.new_session();
    session.begin().await?;

    let from: Account = session
        .where_(("owner", "alice"))
        .where_(("balance", op::GTE, 100))
        .first()
        .await?;
    let debited = session
        .table("account")
        .id(from.id)
        .update(serde_json::json!({ "balance": from.balance - 100 }))
        .await?;
    let credited = session
        .exec(
            "update account set balance = balance + ? where owner = ?",
            &[100.into(), "bob".into()],
        )
        .await?
        .rows_affected;

    if debited == 1 && credited == 1 {
        session.commit().await?;
    } else {
        println!("transfer incomplete, rolling back");
        session.rollback().await?;
    }

    let accounts: Vec<Account> = db.table("account").order_by("id").find().await?;
    for account in accounts {
        println!("{account:?}");
    }

    session.close().await?;
    db.close().await;
    Ok(())
}
