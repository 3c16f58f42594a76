//! DELETE rendering

use super::statement::Statement;
use crate::Result;

impl Statement {
    /// Render a DELETE. Like UPDATE, a WHERE clause is mandatory.
    pub fn build_delete(&self) -> Result<String> {
        let table = self.require_table()?;
        let condition = self.require_where()?;
        Ok(format!("delete from `{table}` where {condition}"))
    }
}
