//! SELECT pipeline.

use super::{
    push_filters, quote_identifier, Projection, Statement, StatementBuilder, StatementKind,
};
use crate::config::{JoinSpec, Limit, QueryConfig, DEFAULT_LIMIT, DEFAULT_OFFSET};
use crate::error::{BuildError, Result};

impl StatementBuilder<'_> {
    /// Builds `SELECT [DISTINCT] <cols|*> FROM <table> [joins] [where] LIMIT offset, count;`.
    ///
    /// Without a configured limit, offset 0 and count 1000 apply.
    pub fn select(&self, projection: &Projection, config: &QueryConfig) -> Result<Statement> {
        let table = self.quoted_table()?;
        let columns = match projection {
            Projection::All => String::from("*"),
            Projection::Columns(cols) if cols.is_empty() => {
                return Err(BuildError::EmptyFields(StatementKind::Select));
            }
            Projection::Columns(cols) => cols.join(","),
        };

        let mut sql = String::from("SELECT ");
        sql.push_str(if config.distinct { "DISTINCT " } else { " " });
        sql.push_str(&columns);
        sql.push_str(" FROM ");
        sql.push_str(&table);
        sql.push(' ');

        push_joins(&mut sql, &config.joins);
        push_filters(&mut sql, config)?;

        let (index, count) = match config.limit {
            None => (DEFAULT_OFFSET, DEFAULT_LIMIT),
            Some(Limit::Range { index, count }) => (index, count),
            Some(Limit::Rows(count)) => (DEFAULT_OFFSET, count),
        };
        sql.push_str(&format!(" LIMIT {index}, {count};"));

        Ok(Statement::new(StatementKind::Select, sql))
    }
}

/// The base table becomes `T1`; joined tables take `T2`, `T3`, ... in order.
fn push_joins(sql: &mut String, joins: &[JoinSpec]) {
    if joins.is_empty() {
        return;
    }
    sql.push_str(" AS T1");
    for (offset, join) in joins.iter().enumerate() {
        let alias = offset + 2;
        sql.push_str(&format!(
            " INNER JOIN {} AS T{alias} ON T1.{} = T{alias}.{}",
            quote_identifier(&join.table),
            quote_identifier(&join.left_column),
            quote_identifier(&join.right_column),
        ));
    }
}
