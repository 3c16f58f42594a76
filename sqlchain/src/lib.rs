//! sqlchain - a fluent MySQL statement builder with session and transaction
//! handling
//!
//! Statements are composed through chained calls, rendered to SQL with `?`
//! placeholders on read paths and escaped literals on write paths, and run
//! through a [`Session`] either in autocommit mode or inside a transaction.
//!
//! ```
//! use sqlchain::{op, table, Value};
//!
//! let (sql, params) = table("users")
//!     .where_(("age", op::GT, 18))
//!     .where_in("status", vec![1, 2])
//!     .order_by("id desc")
//!     .limit(10)
//!     .build_select()
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "select * from users where age > ? and status in (?,?) order by id desc limit 10"
//! );
//! assert_eq!(params, vec![Value::Int(18), Value::Int(1), Value::Int(2)]);
//! ```

pub mod builder;
pub mod codec;
pub mod config;
pub mod db;
pub mod error;
pub mod executor;
pub mod operator;
pub mod record;
pub mod session;
pub mod value;

// Re-export main types
pub use builder::{IntoColumns, IntoPredicate, JoinType, Joiner, Predicate, PredicateSet, Statement};
pub use config::ConnectOptions;
pub use db::{scan, Db};
pub use error::{Error, Result};
pub use executor::{ConnectionPool, ExecResult, Row, Transaction, TransactionalPool};
pub use operator::{op, IntoOperator, Operator};
pub use record::{Field, IntoWritable, Record, Writable};
pub use session::Session;
pub use value::Value;

#[cfg(feature = "mysql")]
pub use executor::mysql::{MySqlConnectionPool, MySqlTransaction};

/// Start a statement on the given table
pub fn table(name: &str) -> Statement {
    Statement::new().table(name)
}
