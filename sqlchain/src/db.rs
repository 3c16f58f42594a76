//! Pool handle and session factory

use crate::executor::{Row, TransactionalPool};
use crate::session::Session;
use crate::{IntoPredicate, Result, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Shared entry point: owns the pool and hands out sessions
///
/// # Examples
/// ```no_run
/// use sqlchain::{ConnectOptions, Db};
///
/// # async fn run() -> sqlchain::Result<()> {
/// let db = Db::connect(&ConnectOptions::default().database("shop")).await?;
/// let adults = db.table("users").where_(("age", ">", 18)).fetch_all().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Db<P> {
    pool: P,
    debug: bool,
}

impl<P: TransactionalPool> Db<P> {
    pub fn new(pool: P) -> Self {
        Self { pool, debug: false }
    }

    /// Toggle statement logging for sessions created afterwards
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// A fresh autocommit session
    pub fn new_session(&self) -> Session<P> {
        Session::new(self.pool.clone()).with_debug(self.debug)
    }

    pub fn table(&self, name: &str) -> Session<P> {
        let mut session = self.new_session();
        session.table(name);
        session
    }

    pub fn where_<W: IntoPredicate>(&self, predicate: W) -> Session<P> {
        let mut session = self.new_session();
        session.where_(predicate);
        session
    }

    pub fn where_in<V: Into<Value>>(&self, column: &str, values: V) -> Session<P> {
        let mut session = self.new_session();
        session.where_in(column, values);
        session
    }

    pub fn where_not_in<V: Into<Value>>(&self, column: &str, values: V) -> Session<P> {
        let mut session = self.new_session();
        session.where_not_in(column, values);
        session
    }

    pub fn where_raw(&self, raw: &str) -> Session<P> {
        let mut session = self.new_session();
        session.where_raw(raw);
        session
    }

    pub fn id<V: Into<Value>>(&self, id: V) -> Session<P> {
        let mut session = self.new_session();
        session.id(id);
        session
    }

    /// One-shot raw query on the pool
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.new_session().query(sql, params).await
    }

    /// One-shot raw statement on the pool; returns the affected row count
    pub async fn exec(&self, sql: &str, params: &[Value]) -> Result<u64> {
        Ok(self.new_session().exec(sql, params).await?.rows_affected)
    }

    /// See [`scan`]
    pub fn scan<S, T>(&self, source: &S) -> Result<T>
    where
        S: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        scan(source)
    }
}

#[cfg(feature = "mysql")]
impl Db<crate::executor::mysql::MySqlConnectionPool> {
    /// Open a MySQL pool and check it with a ping
    pub async fn connect(options: &crate::ConnectOptions) -> Result<Self> {
        use sqlx::Connection;

        let (min_idle, max_open) = options.pool_bounds();
        let pool = sqlx::mysql::MySqlPoolOptions::new()
            .max_connections(max_open)
            .min_connections(min_idle)
            .connect_with(options.to_mysql_options())
            .await?;
        pool.acquire().await?.ping().await?;

        tracing::info!(
            target: "sqlchain::db",
            host = %options.host,
            port = options.port,
            database = %options.database,
            max_open,
            "connected"
        );

        let mut db = Self::new(crate::executor::mysql::MySqlConnectionPool::from_pool(pool));
        db.set_debug(options.debug);
        Ok(db)
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.inner().close().await;
    }
}

/// Copy between structural shapes: a row into a record, a list of rows into
/// a list of records, or any serializable value into a compatible type.
///
/// ```
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct User {
///     id: i64,
/// }
///
/// let rows = vec![serde_json::json!({"id": 1}), serde_json::json!({"id": 2})];
/// let users: Vec<User> = sqlchain::scan(&rows).unwrap();
/// assert_eq!(users[1].id, 2);
/// ```
pub fn scan<S, T>(source: &S) -> Result<T>
where
    S: Serialize + ?Sized,
    T: DeserializeOwned,
{
    Ok(serde_json::from_value(serde_json::to_value(source)?)?)
}
