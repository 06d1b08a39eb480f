//! DELETE pipeline.

use super::{push_filters, Statement, StatementBuilder, StatementKind};
use crate::config::{Limit, QueryConfig};
use crate::error::{BuildError, Result};

impl StatementBuilder<'_> {
    /// Builds `DELETE FROM <table> [where] [LIMIT n];`.
    ///
    /// Only a bare row count is accepted as limit.
    pub fn delete(&self, config: &QueryConfig) -> Result<Statement> {
        let table = self.quoted_table()?;

        let mut sql = format!("DELETE FROM {table}");
        push_filters(&mut sql, config)?;

        match config.limit {
            None => {}
            Some(Limit::Rows(rows)) => sql.push_str(&format!(" LIMIT {rows}")),
            Some(Limit::Range { .. }) => {
                return Err(BuildError::InvalidLimit(StatementKind::Delete));
            }
        }
        sql.push(';');

        Ok(Statement::new(StatementKind::Delete, sql))
    }
}
