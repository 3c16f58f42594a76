//! INSERT rendering

use super::statement::Statement;
use crate::codec::to_literal;
use crate::record::Writable;
use crate::{Error, Result, Value};

fn column_list(columns: &[String]) -> String {
    format!("`{}`", columns.join("`,`"))
}

fn tuple(values: &[Value]) -> String {
    let literals: Vec<String> = values.iter().map(to_literal).collect();
    format!("({})", literals.join(","))
}

impl Statement {
    /// Render a single-row INSERT. The primary key and null values are left
    /// out.
    pub fn build_insert(&self, data: &Writable) -> Result<String> {
        let table = self.require_table()?;
        let pairs = data.extract(Some(&self.primary_key), true);
        if pairs.is_empty() {
            return Err(Error::invalid_shape("no columns to insert"));
        }
        let (columns, values): (Vec<String>, Vec<Value>) = pairs.into_iter().unzip();
        Ok(format!(
            "insert into `{table}` ({}) values {}",
            column_list(&columns),
            tuple(&values)
        ))
    }

    /// Render a multi-row INSERT. Columns come from the first row; a column
    /// missing from a later row is written as `null`. Returns `None` for an
    /// empty batch.
    pub fn build_multi_insert(&self, rows: &[Writable]) -> Result<Option<String>> {
        let table = self.require_table()?;
        let Some(first) = rows.first() else {
            return Ok(None);
        };

        if let Some(position) = rows.iter().position(|row| row.shape() != first.shape()) {
            return Err(Error::invalid_shape(format!(
                "batch element {position} is a {:?}, expected {:?}",
                rows[position].shape(),
                first.shape()
            )));
        }

        let primary_key = Some(self.primary_key.as_str());
        let columns: Vec<String> = first
            .extract(primary_key, false)
            .into_iter()
            .map(|(column, _)| column)
            .collect();
        if columns.is_empty() {
            return Err(Error::invalid_shape("no columns to insert"));
        }

        let tuples: Vec<String> = rows
            .iter()
            .map(|row| {
                let mut pairs = row.extract(primary_key, false);
                let values: Vec<Value> = columns
                    .iter()
                    .map(|column| {
                        pairs
                            .iter()
                            .position(|(c, _)| c == column)
                            .map(|i| pairs.swap_remove(i).1)
                            .unwrap_or(Value::Null)
                    })
                    .collect();
                tuple(&values)
            })
            .collect();

        Ok(Some(format!(
            "insert into `{table}` ({}) values {}",
            column_list(&columns),
            tuples.join(",")
        )))
    }
}
