//! INSERT pipeline.

use super::{Statement, StatementBuilder, StatementKind};
use crate::error::{BuildError, Result};
use crate::value::{encode_quoted, FieldValue};

impl StatementBuilder<'_> {
    /// Builds `INSERT INTO <table> (col1,col2) VALUES (lit1, lit2)`.
    ///
    /// Values are taken in their own positional order and must line up with
    /// the column names. Text is always quoted so values such as `"007"`
    /// keep their leading zeros; raw expressions are emitted verbatim.
    pub fn insert<C: AsRef<str>>(
        &self,
        columns: &[C],
        values: &[FieldValue],
    ) -> Result<Statement> {
        let table = self.quoted_table()?;
        if columns.is_empty() {
            return Err(BuildError::EmptyFields(StatementKind::Insert));
        }
        if columns.len() != values.len() {
            return Err(BuildError::InsertArity {
                columns: columns.len(),
                values: values.len(),
            });
        }

        let column_list: Vec<&str> = columns.iter().map(AsRef::as_ref).collect();
        let value_list: Vec<String> = values
            .iter()
            .map(|value| match value {
                FieldValue::Literal(v) => encode_quoted(v),
                FieldValue::Raw(expr) => expr.clone(),
            })
            .collect();

        Ok(Statement::new(
            StatementKind::Insert,
            format!(
                "INSERT INTO {table} ({}) VALUES ({})",
                column_list.join(","),
                value_list.join(", ")
            ),
        ))
    }
}
