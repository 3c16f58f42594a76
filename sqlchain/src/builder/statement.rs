//! Clause state shared by every statement kind
//!
//! A [`Statement`] accumulates table, alias, join, predicates and the other
//! clauses through chained calls. The SQL renderers live next to it in
//! `select.rs`, `insert.rs`, `update.rs` and `delete.rs`.

use super::common::{IntoColumns, IntoPredicate, JoinType, Joiner, Predicate};
use super::predicate::PredicateSet;
use crate::{Error, Operator, Result, Value};

/// Primary key column used when none is configured
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Mutable clause state for one logical query chain
///
/// # Examples
/// ```
/// use sqlchain::{op, Statement, Value};
///
/// let (sql, params) = Statement::new()
///     .table("users")
///     .where_(("age", op::GT, 18))
///     .limit(10)
///     .build_select()
///     .unwrap();
///
/// assert_eq!(sql, "select * from users where age > ? limit 10");
/// assert_eq!(params, vec![Value::Int(18)]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub(crate) table: String,
    pub(crate) alias: String,
    pub(crate) primary_key: String,
    pub(crate) fields: Vec<String>,
    pub(crate) join: Option<String>,
    pub(crate) predicates: PredicateSet,
    pub(crate) order_by: Option<String>,
    pub(crate) group_by: Option<String>,
    pub(crate) limit: Option<String>,
    pub(crate) distinct: Option<String>,
}

impl Default for Statement {
    fn default() -> Self {
        Self {
            table: String::new(),
            alias: String::new(),
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            fields: Vec::new(),
            join: None,
            predicates: PredicateSet::new(),
            order_by: None,
            group_by: None,
            limit: None,
            distinct: None,
        }
    }
}

/// Log a misuse that leaves the statement unchanged
fn misuse(method: &str, message: &str) {
    tracing::error!(target: "sqlchain::builder", method, "{message}");
}

impl Statement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target table
    pub fn table(mut self, name: &str) -> Self {
        self.table = name.trim().to_string();
        self
    }

    /// Alias the base table
    ///
    /// # Panics
    /// Panics on a blank alias.
    pub fn alias(mut self, alias: &str) -> Self {
        let alias = alias.trim();
        if alias.is_empty() {
            misuse("alias", "alias cannot be empty");
            panic!("alias cannot be empty");
        }
        self.alias = alias.to_string();
        self
    }

    /// Override the primary key column excluded from writes
    ///
    /// # Panics
    /// Panics on a blank column name.
    pub fn set_pk(mut self, primary_key: &str) -> Self {
        let primary_key = primary_key.trim();
        if primary_key.is_empty() {
            misuse("set_pk", "primary key cannot be empty");
            panic!("primary key cannot be empty");
        }
        self.primary_key = primary_key.to_string();
        self
    }

    /// Select these columns instead of `*`
    pub fn fields<C: IntoColumns>(mut self, columns: C) -> Self {
        self.fields = columns.into_columns();
        self
    }

    /// `select distinct <expr>`; a blank expression clears it
    pub fn distinct(mut self, expr: &str) -> Self {
        let expr = expr.trim();
        self.distinct = (!expr.is_empty()).then(|| format!("distinct {expr}"));
        self
    }

    /// Add an AND predicate
    pub fn where_<P: IntoPredicate>(mut self, predicate: P) -> Self {
        self.predicates.push(Joiner::And, predicate.into_predicate());
        self
    }

    /// Add an OR predicate
    pub fn or_where<P: IntoPredicate>(mut self, predicate: P) -> Self {
        self.predicates.push(Joiner::Or, predicate.into_predicate());
        self
    }

    /// Set the raw fragment appended to the WHERE clause with `and`
    pub fn where_raw(mut self, raw: &str) -> Self {
        if raw.trim().is_empty() {
            misuse("where_raw", "raw condition cannot be empty");
            return self;
        }
        self.predicates.set_raw(raw.trim());
        self
    }

    pub fn where_in<V: Into<Value>>(mut self, column: &str, values: V) -> Self {
        self.predicates.push(
            Joiner::And,
            Predicate::Compare(column.to_string(), Operator::IN, values.into()),
        );
        self
    }

    pub fn where_not_in<V: Into<Value>>(mut self, column: &str, values: V) -> Self {
        self.predicates.push(
            Joiner::And,
            Predicate::Compare(column.to_string(), Operator::NOT_IN, values.into()),
        );
        self
    }

    /// Filter on the primary key: a list becomes IN, a scalar equality
    pub fn id<V: Into<Value>>(self, id: V) -> Self {
        let id = id.into();
        let primary_key = self.primary_key.clone();
        match id {
            Value::Array(_) | Value::Json(serde_json::Value::Array(_)) => {
                self.where_in(&primary_key, id)
            }
            scalar => self.where_((primary_key, scalar)),
        }
    }

    /// `limit count`
    pub fn limit(mut self, count: u64) -> Self {
        self.limit = Some(format!("limit {count}"));
        self
    }

    /// `limit offset,count`
    pub fn limit_offset(mut self, offset: u64, count: u64) -> Self {
        self.limit = Some(format!("limit {offset},{count}"));
        self
    }

    pub fn order_by(mut self, expr: &str) -> Self {
        if expr.trim().is_empty() {
            misuse("order_by", "order by expression cannot be empty");
            return self;
        }
        self.order_by = Some(expr.trim().to_string());
        self
    }

    pub fn group_by(mut self, expr: &str) -> Self {
        if expr.trim().is_empty() {
            misuse("group_by", "group by expression cannot be empty");
            return self;
        }
        self.group_by = Some(expr.trim().to_string());
        self
    }

    /// Attach a join. The joined table is aliased `B`; the base table gets
    /// alias `A` unless one is already set.
    pub fn join_with(mut self, kind: JoinType, table: &str, condition: &str) -> Self {
        if condition.trim().is_empty() {
            misuse("join", "join condition cannot be empty");
            return self;
        }
        if self.alias.is_empty() {
            self.alias = "A".to_string();
        }
        self.join = Some(format!(" {kind} {} as B on {}", table.trim(), condition.trim()));
        self
    }

    pub fn join(self, table: &str, condition: &str) -> Self {
        self.join_with(JoinType::Inner, table, condition)
    }

    pub fn left_join(self, table: &str, condition: &str) -> Self {
        self.join_with(JoinType::Left, table, condition)
    }

    pub fn right_join(self, table: &str, condition: &str) -> Self {
        self.join_with(JoinType::Right, table, condition)
    }

    pub fn full_join(self, table: &str, condition: &str) -> Self {
        self.join_with(JoinType::Full, table, condition)
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn predicates(&self) -> &PredicateSet {
        &self.predicates
    }

    /// Fill in the table when the caller did not name one
    pub(crate) fn default_table(&mut self, name: String) {
        if self.table.is_empty() {
            self.table = name;
        }
    }

    pub(crate) fn set_fields(&mut self, fields: Vec<String>) {
        self.fields = fields;
    }

    pub(crate) fn require_table(&self) -> Result<&str> {
        if self.table.is_empty() {
            return Err(Error::MissingTableName);
        }
        Ok(&self.table)
    }

    /// The inlined WHERE condition, required by UPDATE and DELETE
    pub(crate) fn require_where(&self) -> Result<String> {
        let condition = self.predicates.render_inlined();
        if condition.is_empty() {
            return Err(Error::MissingWhereClause);
        }
        Ok(condition)
    }
}
