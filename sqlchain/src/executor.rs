//! Executor boundary: connection pools and transactions

use crate::{Error, Result, Value};
use serde::de::DeserializeOwned;
use std::future::Future;

/// One result row: column name to decoded value, in select order
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Outcome of a statement that returns no rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    pub last_insert_id: u64,
}

/// Trait for database connection pools
pub trait ConnectionPool: Send + Sync + Clone {
    /// Execute a statement that returns no rows (INSERT, UPDATE, DELETE)
    fn execute(&self, sql: &str, params: &[Value]) -> impl Future<Output = Result<ExecResult>> + Send;

    /// Execute a query and decode every row
    fn fetch_all(&self, sql: &str, params: &[Value]) -> impl Future<Output = Result<Vec<Row>>> + Send;
}

/// Trait for an open database transaction
pub trait Transaction: Send {
    fn execute(&mut self, sql: &str, params: &[Value]) -> impl Future<Output = Result<ExecResult>> + Send;

    fn fetch_all(&mut self, sql: &str, params: &[Value]) -> impl Future<Output = Result<Vec<Row>>> + Send;

    /// Commit the transaction
    fn commit(self) -> impl Future<Output = Result<()>> + Send
    where
        Self: Sized;

    /// Rollback the transaction
    fn rollback(self) -> impl Future<Output = Result<()>> + Send
    where
        Self: Sized;
}

/// Extension trait for connection pools to support transactions
pub trait TransactionalPool: ConnectionPool {
    type Transaction: Transaction;

    /// Start a new transaction
    fn begin_transaction(&self) -> impl Future<Output = Result<Self::Transaction>> + Send;
}

/// Deserialize a row into a typed record
pub fn from_row<T: DeserializeOwned>(row: Row) -> Result<T> {
    Ok(serde_json::from_value(serde_json::Value::Object(row))?)
}

/// Deserialize every row into a typed record
pub fn from_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>> {
    rows.into_iter().map(from_row).collect()
}

/// Read the `aggregate` column produced by a COUNT query
pub(crate) fn aggregate(row: &Row) -> Result<i64> {
    match row.get("aggregate") {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| Error::decode("aggregate", format!("{n} is not an integer"))),
        Some(serde_json::Value::String(s)) => s
            .parse()
            .map_err(|e: std::num::ParseIntError| Error::decode("aggregate", e.to_string())),
        _ => Err(Error::decode("aggregate", "column missing from count result")),
    }
}

/// sqlx-backed MySQL pool
#[cfg(feature = "mysql")]
pub mod mysql {
    use super::*;
    use futures::TryStreamExt;
    use sqlx::mysql::{MySqlArguments, MySqlPool, MySqlRow};
    use sqlx::{Column, Row as _, TypeInfo, ValueRef};

    type MySqlQuery<'q> = sqlx::query::Query<'q, sqlx::MySql, MySqlArguments>;

    /// MySQL connection pool wrapper
    #[derive(Debug, Clone)]
    pub struct MySqlConnectionPool {
        inner: MySqlPool,
    }

    impl MySqlConnectionPool {
        /// Create a new pool from a connection string
        pub async fn connect(database_url: &str) -> Result<Self> {
            let pool = MySqlPool::connect(database_url).await?;
            Ok(Self { inner: pool })
        }

        /// Create from an existing MySqlPool
        pub fn from_pool(pool: MySqlPool) -> Self {
            Self { inner: pool }
        }

        pub fn inner(&self) -> &MySqlPool {
            &self.inner
        }
    }

    impl ConnectionPool for MySqlConnectionPool {
        async fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecResult> {
            let result = bind_values(sqlx::query(sql), params)
                .execute(&self.inner)
                .await?;
            Ok(ExecResult {
                rows_affected: result.rows_affected(),
                last_insert_id: result.last_insert_id(),
            })
        }

        async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
            let mut stream = bind_values(sqlx::query(sql), params).fetch(&self.inner);
            let mut rows = Vec::new();
            while let Some(row) = stream.try_next().await? {
                rows.push(row_to_map(&row)?);
            }
            Ok(rows)
        }
    }

    /// MySQL transaction wrapper. Dropping it unfinished rolls back.
    pub struct MySqlTransaction {
        inner: sqlx::Transaction<'static, sqlx::MySql>,
    }

    impl Transaction for MySqlTransaction {
        async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ExecResult> {
            let result = bind_values(sqlx::query(sql), params)
                .execute(&mut *self.inner)
                .await?;
            Ok(ExecResult {
                rows_affected: result.rows_affected(),
                last_insert_id: result.last_insert_id(),
            })
        }

        async fn fetch_all(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
            let mut stream = bind_values(sqlx::query(sql), params).fetch(&mut *self.inner);
            let mut rows = Vec::new();
            while let Some(row) = stream.try_next().await? {
                rows.push(row_to_map(&row)?);
            }
            Ok(rows)
        }

        async fn commit(self) -> Result<()> {
            self.inner.commit().await?;
            Ok(())
        }

        async fn rollback(self) -> Result<()> {
            self.inner.rollback().await?;
            Ok(())
        }
    }

    impl TransactionalPool for MySqlConnectionPool {
        type Transaction = MySqlTransaction;

        async fn begin_transaction(&self) -> Result<Self::Transaction> {
            let txn = self.inner.begin().await?;
            Ok(MySqlTransaction { inner: txn })
        }
    }

    fn bind_values<'q>(mut query: MySqlQuery<'q>, params: &'q [Value]) -> MySqlQuery<'q> {
        for param in params {
            query = match param {
                Value::Null => query.bind(None::<String>),
                Value::Bool(b) => query.bind(*b),
                Value::Int(i) => query.bind(*i),
                Value::UInt(u) => query.bind(*u),
                Value::F32(f) => query.bind(*f),
                Value::F64(f) => query.bind(*f),
                Value::String(s) => query.bind(s.as_str()),
                Value::Bytes(b) => query.bind(b.as_slice()),
                Value::Json(_) | Value::Array(_) => query.bind(param.to_json().to_string()),
            };
        }
        query
    }

    fn row_to_map(row: &MySqlRow) -> Result<Row> {
        let mut map = Row::new();
        for column in row.columns() {
            let value = decode_column(row, column.ordinal(), column.type_info().name())
                .map_err(|e| Error::decode(column.name(), e.to_string()))?;
            map.insert(column.name().to_string(), value);
        }
        Ok(map)
    }

    /// Decode one column by its MySQL type. Temporal and decimal values
    /// become text; binary payloads are decoded lossily to text.
    fn decode_column(
        row: &MySqlRow,
        index: usize,
        type_name: &str,
    ) -> std::result::Result<serde_json::Value, sqlx::Error> {
        use serde_json::Value as Json;

        if row.try_get_raw(index)?.is_null() {
            return Ok(Json::Null);
        }

        let value = match type_name {
            "BOOLEAN" => Json::from(row.try_get::<bool, _>(index)?),
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
                Json::from(row.try_get::<i64, _>(index)?)
            }
            "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
            | "BIGINT UNSIGNED" => Json::from(row.try_get::<u64, _>(index)?),
            "YEAR" => Json::from(row.try_get_unchecked::<u16, _>(index)?),
            "FLOAT" => Json::from(row.try_get::<f32, _>(index)?),
            "DOUBLE" => Json::from(row.try_get::<f64, _>(index)?),
            "DECIMAL" => Json::String(row.try_get::<rust_decimal::Decimal, _>(index)?.to_string()),
            "DATE" => Json::String(row.try_get::<chrono::NaiveDate, _>(index)?.to_string()),
            "TIME" => Json::String(row.try_get::<chrono::NaiveTime, _>(index)?.to_string()),
            "DATETIME" | "TIMESTAMP" => {
                Json::String(row.try_get::<chrono::NaiveDateTime, _>(index)?.to_string())
            }
            "JSON" => row.try_get::<serde_json::Value, _>(index)?,
            _ => match row.try_get::<String, _>(index) {
                Ok(text) => Json::String(text),
                Err(_) => {
                    let bytes = row.try_get_unchecked::<Vec<u8>, _>(index)?;
                    Json::String(String::from_utf8_lossy(&bytes).into_owned())
                }
            },
        };
        Ok(value)
    }
}

/// In-memory pool that records every call
#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub struct MockPool {
        calls: Arc<Mutex<Vec<String>>>,
        results: Arc<Mutex<VecDeque<Vec<Row>>>>,
        fail: Arc<AtomicBool>,
    }

    impl MockPool {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue the rows returned by the next fetch
        pub fn push_rows(&self, rows: Vec<Row>) {
            self.results.lock().unwrap().push_back(rows);
        }

        /// Make every statement fail
        pub fn fail(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) -> Result<()> {
            self.calls.lock().unwrap().push(call);
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::Database(sqlx::Error::Protocol("mock failure".to_string())));
            }
            Ok(())
        }

        fn next_rows(&self) -> Vec<Row> {
            self.results.lock().unwrap().pop_front().unwrap_or_default()
        }
    }

    impl ConnectionPool for MockPool {
        async fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecResult> {
            self.record(format!("execute {sql} {params:?}"))?;
            Ok(ExecResult {
                rows_affected: 2,
                last_insert_id: 42,
            })
        }

        async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
            self.record(format!("fetch {sql} {params:?}"))?;
            Ok(self.next_rows())
        }
    }

    pub struct MockTransaction {
        pool: MockPool,
    }

    impl Transaction for MockTransaction {
        async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ExecResult> {
            self.pool.record(format!("tx execute {sql} {params:?}"))?;
            Ok(ExecResult {
                rows_affected: 1,
                last_insert_id: 7,
            })
        }

        async fn fetch_all(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
            self.pool.record(format!("tx fetch {sql} {params:?}"))?;
            Ok(self.pool.next_rows())
        }

        async fn commit(self) -> Result<()> {
            self.pool.record("commit".to_string())
        }

        async fn rollback(self) -> Result<()> {
            self.pool.record("rollback".to_string())
        }
    }

    impl TransactionalPool for MockPool {
        type Transaction = MockTransaction;

        async fn begin_transaction(&self) -> Result<Self::Transaction> {
            self.record("begin".to_string())?;
            Ok(MockTransaction { pool: self.clone() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: i64,
        name: String,
    }

    #[test]
    fn test_from_rows() {
        let rows = vec![
            row(json!({"id": 1, "name": "a"})),
            row(json!({"id": 2, "name": "b", "extra": true})),
        ];
        let users: Vec<User> = from_rows(rows).unwrap();
        assert_eq!(users[1], User { id: 2, name: "b".to_string() });
    }

    #[test]
    fn test_from_row_type_mismatch() {
        let err = from_row::<User>(row(json!({"id": "x", "name": "a"}))).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_aggregate() {
        assert_eq!(aggregate(&row(json!({"aggregate": 12}))).unwrap(), 12);
        assert_eq!(aggregate(&row(json!({"aggregate": "7"}))).unwrap(), 7);
        assert!(aggregate(&row(json!({"total": 1}))).is_err());
    }

    #[test]
    fn test_row_preserves_column_order() {
        let r = row(json!({"z": 1, "a": 2, "m": 3}));
        let keys: Vec<&String> = r.keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[tokio::test]
    async fn test_mock_pool_records_calls() {
        let pool = mock::MockPool::new();
        pool.push_rows(vec![row(json!({"id": 1}))]);

        let rows = pool.fetch_all("select 1", &[Value::Int(1)]).await.unwrap();
        assert_eq!(rows.len(), 1);

        let mut tx = pool.begin_transaction().await.unwrap();
        tx.execute("delete from `t` where id = 1", &[]).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(
            pool.calls(),
            vec![
                "fetch select 1 [Int(1)]",
                "begin",
                "tx execute delete from `t` where id = 1 []",
                "commit",
            ]
        );
    }
}
