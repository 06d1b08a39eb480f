//! Statement execution.
//!
//! An [`Executor`] runs one finished SQL text. Fetch statements materialize
//! every row as a [`Record`]; other statements report the affected-row count.

use std::fmt::Display;
use std::future::Future;

use chrono::{DateTime, TimeZone};
use sqlx::sqlite::SqlitePool;
use tracing::debug;

use crate::error::Result;
use crate::record::Record;

/// Outcome of one executed statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    /// Affected rows for writes, returned rows for fetches.
    pub row_count: u64,
    /// Materialized rows; `None` for writes.
    pub records: Option<Vec<Record>>,
}

impl QueryOutput {
    /// Output of a fetch. The row count is the number of records.
    #[must_use]
    pub fn fetched(records: Vec<Record>) -> Self {
        Self {
            row_count: records.len() as u64,
            records: Some(records),
        }
    }

    /// Output of a write.
    #[must_use]
    pub const fn affected(row_count: u64) -> Self {
        Self {
            row_count,
            records: None,
        }
    }
}

/// Runs finished SQL text against a backend.
pub trait Executor {
    /// Executes `sql`. When `fetch` is set, all rows are returned.
    fn execute(&self, sql: &str, fetch: bool) -> impl Future<Output = Result<QueryOutput>> + Send;
}

impl Executor for SqlitePool {
    async fn execute(&self, sql: &str, fetch: bool) -> Result<QueryOutput> {
        if fetch {
            let rows = sqlx::query(sql).fetch_all(self).await?;
            let records = rows
                .iter()
                .map(Record::from_row)
                .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?;
            Ok(QueryOutput::fetched(records))
        } else {
            let rewritten = rewrite_limited_delete(sql);
            if let Some(rewritten) = &rewritten {
                debug!(sql = %rewritten, "Rewrote limited delete");
            }
            let result = sqlx::query(rewritten.as_deref().unwrap_or(sql))
                .execute(self)
                .await?;
            Ok(QueryOutput::affected(result.rows_affected()))
        }
    }
}

/// Turns `DELETE FROM <table> [where] LIMIT n;` into
/// `DELETE FROM <table> WHERE rowid IN (SELECT rowid FROM <table> [where] LIMIT n);`.
///
/// Stock SQLite builds reject a LIMIT on DELETE. Returns `None` for any
/// other statement. Tables declared `WITHOUT ROWID` cannot be limited.
fn rewrite_limited_delete(sql: &str) -> Option<String> {
    let rest = sql.strip_prefix("DELETE FROM `")?;

    let mut from = 0;
    let end = loop {
        let pos = from + rest[from..].find('`')?;
        if rest[pos + 1..].starts_with('`') {
            from = pos + 2;
        } else {
            break pos;
        }
    };
    let table = &sql["DELETE FROM ".len()..="DELETE FROM ".len() + end + 1];

    let body = rest[end + 1..].strip_suffix(';')?;
    let (filters, count) = body.rsplit_once(" LIMIT ")?;
    if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!(
        "DELETE FROM {table} WHERE rowid IN (SELECT rowid FROM {table}{filters} LIMIT {count});"
    ))
}

/// Substitutes `NOW()` with the date and `TIME()` with the date and time.
///
/// The substitution is textual and applies anywhere in the statement.
pub fn expand_time_macros<Tz>(sql: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if !sql.contains("NOW()") && !sql.contains("TIME()") {
        return String::from(sql);
    }
    let expanded = sql
        .replace("NOW()", &now.format("%Y-%m-%d").to_string())
        .replace("TIME()", &now.format("%Y-%m-%d %H:%M:%S").to_string());
    debug!(sql = %expanded, "Expanded time macros");
    expanded
}
