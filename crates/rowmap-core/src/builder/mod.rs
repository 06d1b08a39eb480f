//! Statement assembly.
//!
//! [`StatementBuilder`] turns a table name, a field specification and a
//! [`QueryConfig`] into one SQL string. Each statement kind has its own
//! pipeline; the where groups and membership clauses are shared.
//!
//! # Example
//!
//! ```rust
//! use rowmap_core::builder::{Projection, StatementBuilder};
//! use rowmap_core::config::QueryConfig;
//!
//! let statement = StatementBuilder::new("actor")
//!     .select(&Projection::All, &QueryConfig::new())
//!     .unwrap();
//!
//! assert_eq!(statement.sql(), "SELECT  * FROM `actor`  LIMIT 0, 1000;");
//! ```

mod delete;
mod insert;
mod select;
mod update;

use std::fmt;
use std::str::FromStr;

use crate::clause;
use crate::config::{MembershipClause, QueryConfig};
use crate::error::{BuildError, Result};
use crate::value::{encode_list, FieldValue};

/// The four statement pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// SELECT
    Select,
    /// UPDATE
    Update,
    /// INSERT
    Insert,
    /// DELETE
    Delete,
}

impl StatementKind {
    /// Returns true if the statement returns rows.
    #[must_use]
    pub const fn is_fetch(self) -> bool {
        matches!(self, Self::Select)
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => write!(f, "SELECT"),
            Self::Update => write!(f, "UPDATE"),
            Self::Insert => write!(f, "INSERT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

impl FromStr for StatementKind {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "select" => Ok(Self::Select),
            "update" => Ok(Self::Update),
            "insert" => Ok(Self::Insert),
            "delete" => Ok(Self::Delete),
            _ => Err(BuildError::UnsupportedStatement(String::from(s))),
        }
    }
}

/// A built statement. Immutable; rebuilt for every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    kind: StatementKind,
    sql: String,
}

impl Statement {
    /// Wraps SQL text of the given kind.
    #[must_use]
    pub fn new(kind: StatementKind, sql: impl Into<String>) -> Self {
        Self {
            kind,
            sql: sql.into(),
        }
    }

    /// Returns the statement kind.
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Returns the SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns true if the statement returns rows.
    #[must_use]
    pub const fn is_fetch(&self) -> bool {
        self.kind.is_fetch()
    }

    /// Consumes the statement and returns the SQL text.
    #[must_use]
    pub fn into_sql(self) -> String {
        self.sql
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Columns returned by SELECT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// `*`
    All,
    /// An explicit column list, emitted as given.
    Columns(Vec<String>),
}

impl Projection {
    /// Creates a column list.
    #[must_use]
    pub fn columns(cols: &[&str]) -> Self {
        Self::Columns(cols.iter().map(|c| String::from(*c)).collect())
    }
}

/// Ordered column assignments for UPDATE and INSERT.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignments(pub Vec<(String, FieldValue)>);

impl Assignments {
    /// Creates an empty assignment list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    #[must_use]
    pub fn set(mut self, column: &str, value: impl Into<FieldValue>) -> Self {
        self.0.push((String::from(column), value.into()));
        self
    }

    /// Adds a raw expression assignment, e.g. `NOW()`.
    #[must_use]
    pub fn set_raw(mut self, column: &str, expr: &str) -> Self {
        self.0.push((String::from(column), FieldValue::raw(expr)));
        self
    }

    /// Returns true if there are no assignments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Fields argument of the generic [`StatementBuilder::build`] entry point.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSpec {
    /// SELECT projection.
    Projection(Projection),
    /// UPDATE / INSERT assignments.
    Assignments(Assignments),
    /// DELETE takes no fields.
    None,
}

/// Quotes an identifier with backticks, doubling embedded backticks.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Builds statements against one table.
#[derive(Debug, Clone, Copy)]
pub struct StatementBuilder<'a> {
    table: &'a str,
}

impl<'a> StatementBuilder<'a> {
    /// Creates a builder for a table.
    #[must_use]
    pub const fn new(table: &'a str) -> Self {
        Self { table }
    }

    /// Returns the table name.
    #[must_use]
    pub const fn table(&self) -> &'a str {
        self.table
    }

    /// Dispatches on the statement kind.
    ///
    /// UPDATE and INSERT need assignments; SELECT without a projection
    /// selects `*`; DELETE ignores fields.
    pub fn build(
        &self,
        kind: StatementKind,
        fields: &FieldSpec,
        config: &QueryConfig,
    ) -> Result<Statement> {
        match (kind, fields) {
            (StatementKind::Select, FieldSpec::Projection(projection)) => {
                self.select(projection, config)
            }
            (StatementKind::Select, _) => self.select(&Projection::All, config),
            (StatementKind::Update, FieldSpec::Assignments(assignments)) => {
                self.update(assignments, config)
            }
            (StatementKind::Insert, FieldSpec::Assignments(assignments)) => {
                let (columns, values): (Vec<String>, Vec<FieldValue>) =
                    assignments.0.iter().cloned().unzip();
                self.insert(&columns, &values)
            }
            (StatementKind::Update | StatementKind::Insert, _) => {
                Err(BuildError::EmptyFields(kind))
            }
            (StatementKind::Delete, _) => self.delete(config),
        }
    }

    /// Builds a statement from a kind name such as `"select"`.
    pub fn build_named(
        &self,
        kind: &str,
        fields: &FieldSpec,
        config: &QueryConfig,
    ) -> Result<Statement> {
        self.build(kind.parse()?, fields, config)
    }

    /// Selects the rows holding the maximum value of a column.
    pub fn max_of(&self, column: &str) -> Result<Statement> {
        self.extreme_of("MAX", column)
    }

    /// Selects the rows holding the minimum value of a column.
    pub fn min_of(&self, column: &str) -> Result<Statement> {
        self.extreme_of("MIN", column)
    }

    fn extreme_of(&self, function: &str, column: &str) -> Result<Statement> {
        let table = self.quoted_table()?;
        let column = quote_identifier(column);
        Ok(Statement::new(
            StatementKind::Select,
            format!(
                "SELECT * FROM {table} WHERE {column} = (SELECT {function}({column}) FROM {table})"
            ),
        ))
    }

    pub(crate) fn quoted_table(&self) -> Result<String> {
        if self.table.trim().is_empty() {
            return Err(BuildError::MissingTable);
        }
        Ok(quote_identifier(self.table))
    }
}

/// Appends the composed where groups and membership clauses.
///
/// The first predicate opens ` WHERE `; later ones are appended with their
/// own operator.
pub(crate) fn push_filters(sql: &mut String, config: &QueryConfig) -> Result<()> {
    let mut opened = false;

    if let Some(expr) = clause::compose(&config.where_groups)? {
        sql.push_str(" WHERE ");
        sql.push_str(&expr);
        opened = true;
    }

    let membership = [
        ("where_in", "IN", config.where_in.as_ref()),
        ("where_not_in", "NOT IN", config.where_not_in.as_ref()),
    ];
    for (name, keyword, clause) in membership {
        let Some(clause) = clause else { continue };
        let source = membership_source(name, clause)?;
        if opened {
            sql.push(' ');
            sql.push_str(&clause.operator.to_string());
            sql.push(' ');
        } else {
            sql.push_str(" WHERE ");
            opened = true;
        }
        sql.push_str(&format!(
            "{} {keyword} ({source})",
            quote_identifier(&clause.field_name)
        ));
    }

    Ok(())
}

fn membership_source(name: &'static str, clause: &MembershipClause) -> Result<String> {
    if let Some(query) = clause.query.as_deref().filter(|q| !q.trim().is_empty()) {
        return Ok(String::from(query.trim()));
    }
    match &clause.options {
        Some(options) if !options.0.is_empty() => Ok(encode_list(&options.0).join(", ")),
        _ => Err(BuildError::MissingMembershipSource { clause: name }),
    }
}
