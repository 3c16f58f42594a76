//! Statement execution and transaction state
//!
//! A [`Session`] owns one [`Statement`] and runs it either on the shared pool
//! (autocommit) or on the transaction it opened. Every terminal operation
//! takes the statement, so the next chain starts from a blank one whether
//! the call succeeded or not.

use crate::builder::{IntoColumns, IntoPredicate, Statement};
use crate::codec::to_bound_param;
use crate::executor::{
    aggregate, from_row, from_rows, ConnectionPool, ExecResult, Row, Transaction, TransactionalPool,
};
use crate::record::{IntoWritable, Record, Writable};
use crate::{Error, Result, Value};
use serde::de::DeserializeOwned;
use std::mem;
use std::time::Instant;

/// One logical unit of work against a pool
pub struct Session<P: TransactionalPool> {
    pool: Option<P>,
    tx: Option<P::Transaction>,
    auto_commit: bool,
    finalized: bool,
    debug: bool,
    statement: Statement,
}

impl<P: TransactionalPool> Session<P> {
    pub fn new(pool: P) -> Self {
        Self {
            pool: Some(pool),
            tx: None,
            auto_commit: true,
            finalized: true,
            debug: false,
            statement: Statement::new(),
        }
    }

    /// Log every executed statement at debug level
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn is_auto_commit(&self) -> bool {
        self.auto_commit
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_none()
    }

    /// The clauses accumulated so far
    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    fn chain(&mut self, f: impl FnOnce(Statement) -> Statement) -> &mut Self {
        let statement = mem::take(&mut self.statement);
        self.statement = f(statement);
        self
    }

    pub fn table(&mut self, name: &str) -> &mut Self {
        self.chain(|s| s.table(name))
    }

    pub fn alias(&mut self, alias: &str) -> &mut Self {
        self.chain(|s| s.alias(alias))
    }

    pub fn set_pk(&mut self, primary_key: &str) -> &mut Self {
        self.chain(|s| s.set_pk(primary_key))
    }

    pub fn fields<C: IntoColumns>(&mut self, columns: C) -> &mut Self {
        self.chain(|s| s.fields(columns))
    }

    pub fn distinct(&mut self, expr: &str) -> &mut Self {
        self.chain(|s| s.distinct(expr))
    }

    pub fn where_<W: IntoPredicate>(&mut self, predicate: W) -> &mut Self {
        self.chain(|s| s.where_(predicate))
    }

    pub fn or_where<W: IntoPredicate>(&mut self, predicate: W) -> &mut Self {
        self.chain(|s| s.or_where(predicate))
    }

    pub fn where_raw(&mut self, raw: &str) -> &mut Self {
        self.chain(|s| s.where_raw(raw))
    }

    pub fn where_in<V: Into<Value>>(&mut self, column: &str, values: V) -> &mut Self {
        self.chain(|s| s.where_in(column, values))
    }

    pub fn where_not_in<V: Into<Value>>(&mut self, column: &str, values: V) -> &mut Self {
        self.chain(|s| s.where_not_in(column, values))
    }

    pub fn id<V: Into<Value>>(&mut self, id: V) -> &mut Self {
        self.chain(|s| s.id(id))
    }

    pub fn limit(&mut self, count: u64) -> &mut Self {
        self.chain(|s| s.limit(count))
    }

    pub fn limit_offset(&mut self, offset: u64, count: u64) -> &mut Self {
        self.chain(|s| s.limit_offset(offset, count))
    }

    pub fn order_by(&mut self, expr: &str) -> &mut Self {
        self.chain(|s| s.order_by(expr))
    }

    pub fn group_by(&mut self, expr: &str) -> &mut Self {
        self.chain(|s| s.group_by(expr))
    }

    pub fn join(&mut self, table: &str, condition: &str) -> &mut Self {
        self.chain(|s| s.join(table, condition))
    }

    pub fn left_join(&mut self, table: &str, condition: &str) -> &mut Self {
        self.chain(|s| s.left_join(table, condition))
    }

    pub fn right_join(&mut self, table: &str, condition: &str) -> &mut Self {
        self.chain(|s| s.right_join(table, condition))
    }

    pub fn full_join(&mut self, table: &str, condition: &str) -> &mut Self {
        self.chain(|s| s.full_join(table, condition))
    }

    /// Insert one record or mapping and return the generated id
    pub async fn insert<W: IntoWritable>(&mut self, data: W) -> Result<u64> {
        let statement = mem::take(&mut self.statement);
        let sql = statement.build_insert(&data.into_writable()?)?;
        Ok(self.run_exec(&sql, Vec::new()).await?.last_insert_id)
    }

    /// Insert a batch in one statement and return the affected row count.
    /// An empty batch executes nothing.
    pub async fn insert_many<W, I>(&mut self, rows: I) -> Result<u64>
    where
        W: IntoWritable,
        I: IntoIterator<Item = W>,
    {
        let statement = mem::take(&mut self.statement);
        let rows = rows
            .into_iter()
            .map(IntoWritable::into_writable)
            .collect::<Result<Vec<Writable>>>()?;
        match statement.build_multi_insert(&rows)? {
            Some(sql) => Ok(self.run_exec(&sql, Vec::new()).await?.rows_affected),
            None => Ok(0),
        }
    }

    pub async fn update<W: IntoWritable>(&mut self, data: W) -> Result<u64> {
        let statement = mem::take(&mut self.statement);
        let sql = statement.build_update(&data.into_writable()?)?;
        Ok(self.run_exec(&sql, Vec::new()).await?.rows_affected)
    }

    pub async fn delete(&mut self) -> Result<u64> {
        let statement = mem::take(&mut self.statement);
        let sql = statement.build_delete()?;
        Ok(self.run_exec(&sql, Vec::new()).await?.rows_affected)
    }

    /// First matching row, if any
    pub async fn fetch(&mut self) -> Result<Option<Row>> {
        let statement = mem::take(&mut self.statement);
        let (sql, mut params) = statement.build_select_single()?;
        params.push(Value::Int(1));
        Ok(self.run_query(&sql, params).await?.into_iter().next())
    }

    pub async fn fetch_all(&mut self) -> Result<Vec<Row>> {
        let statement = mem::take(&mut self.statement);
        let (sql, params) = statement.build_select()?;
        self.run_query(&sql, params).await
    }

    /// First matching record; `NoRowsFound` when nothing matches.
    ///
    /// Selects the record's columns and falls back to its table name.
    pub async fn first<T: Record + DeserializeOwned>(&mut self) -> Result<T> {
        let mut statement = mem::take(&mut self.statement);
        statement.default_table(T::table_name());
        statement.set_fields(T::columns());
        let (sql, mut params) = statement.build_select_single()?;
        params.push(Value::Int(1));
        let row = self
            .run_query(&sql, params)
            .await?
            .into_iter()
            .next()
            .ok_or(Error::NoRowsFound)?;
        from_row(row)
    }

    /// Every matching record
    pub async fn find<T: Record + DeserializeOwned>(&mut self) -> Result<Vec<T>> {
        let mut statement = mem::take(&mut self.statement);
        statement.default_table(T::table_name());
        statement.set_fields(T::columns());
        let (sql, params) = statement.build_select()?;
        from_rows(self.run_query(&sql, params).await?)
    }

    pub async fn count(&mut self) -> Result<i64> {
        let statement = mem::take(&mut self.statement);
        let (sql, params) = statement.build_count()?;
        let rows = self.run_query(&sql, params).await?;
        rows.first().ok_or(Error::NoRowsFound).and_then(aggregate)
    }

    /// Run raw SQL returning rows
    pub async fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.statement = Statement::new();
        self.run_query(sql, params.to_vec()).await
    }

    /// Run raw SQL returning no rows
    pub async fn exec(&mut self, sql: &str, params: &[Value]) -> Result<ExecResult> {
        self.statement = Statement::new();
        self.run_exec(sql, params.to_vec()).await
    }

    /// Open a transaction. A second call while one is open does nothing.
    pub async fn begin(&mut self) -> Result<()> {
        self.log_transaction("begin");
        if self.auto_commit {
            let pool = self.pool.as_ref().ok_or(Error::SessionClosed)?;
            let tx = pool.begin_transaction().await?;
            self.tx = Some(tx);
            self.auto_commit = false;
            self.finalized = false;
        }
        Ok(())
    }

    /// Commit the open transaction; without one this is a no-op
    pub async fn commit(&mut self) -> Result<()> {
        self.log_transaction("commit");
        match self.finish() {
            Some(tx) => tx.commit().await,
            None => Ok(()),
        }
    }

    /// Roll back the open transaction; without one this is a no-op
    pub async fn rollback(&mut self) -> Result<()> {
        self.log_transaction("rollback");
        match self.finish() {
            Some(tx) => tx.rollback().await,
            None => Ok(()),
        }
    }

    /// Roll back anything unfinished and release the pool. Idempotent.
    pub async fn close(&mut self) -> Result<()> {
        if self.pool.is_none() {
            return Ok(());
        }
        let result = self.rollback().await;
        self.tx = None;
        self.pool = None;
        result
    }

    /// Leave IN_TRANSACTION, handing back the transaction to finalize
    fn finish(&mut self) -> Option<P::Transaction> {
        if self.auto_commit || self.finalized {
            return None;
        }
        self.auto_commit = true;
        self.finalized = true;
        self.tx.take()
    }

    async fn run_query(&mut self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>> {
        let params: Vec<Value> = params.into_iter().map(to_bound_param).collect();
        let start = Instant::now();
        let result = match self.tx.as_mut() {
            Some(tx) => tx.fetch_all(sql, &params).await,
            None => match &self.pool {
                Some(pool) => pool.fetch_all(sql, &params).await,
                None => return Err(Error::SessionClosed),
            },
        };
        self.log_statement(start, sql, &params);
        result
    }

    async fn run_exec(&mut self, sql: &str, params: Vec<Value>) -> Result<ExecResult> {
        let params: Vec<Value> = params.into_iter().map(to_bound_param).collect();
        let start = Instant::now();
        let result = match self.tx.as_mut() {
            Some(tx) => tx.execute(sql, &params).await,
            None => match &self.pool {
                Some(pool) => pool.execute(sql, &params).await,
                None => return Err(Error::SessionClosed),
            },
        };
        self.log_statement(start, sql, &params);
        result
    }

    fn log_statement(&self, start: Instant, sql: &str, params: &[Value]) {
        if self.debug {
            tracing::debug!(
                target: "sqlchain::sql",
                elapsed_ms = start.elapsed().as_millis() as u64,
                sql = %sql.to_lowercase(),
                params = ?params,
                "sql"
            );
        }
    }

    fn log_transaction(&self, action: &str) {
        if self.debug {
            tracing::debug!(target: "sqlchain::tx", action, auto_commit = self.auto_commit, "transaction");
        }
    }
}
