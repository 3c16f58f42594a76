//! UPDATE rendering

use super::statement::Statement;
use crate::codec::to_literal;
use crate::record::Writable;
use crate::{Error, Result};

impl Statement {
    /// Render an UPDATE with inlined values.
    ///
    /// Fails with `MissingWhereClause` when no predicate survives selection;
    /// an UPDATE never touches every row.
    pub fn build_update(&self, data: &Writable) -> Result<String> {
        let table = self.require_table()?;
        let condition = self.require_where()?;

        let assignments: Vec<String> = data
            .extract(Some(&self.primary_key), true)
            .into_iter()
            .map(|(column, value)| format!("{column}={}", to_literal(&value)))
            .collect();
        if assignments.is_empty() {
            return Err(Error::invalid_shape("no columns to update"));
        }

        Ok(format!(
            "update `{table}` set {} where {condition}",
            assignments.join(",")
        ))
    }
}
