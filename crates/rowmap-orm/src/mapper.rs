//! The mapper facade.
//!
//! A [`Mapper`] is bound to one table. Every operation builds a fresh
//! statement from its arguments, expands the time macros and hands the text
//! to the [`Executor`]. Two call styles are offered:
//!
//! - `try_select`, `try_update`, ... return the outcome and leave the mapper
//!   untouched.
//! - `select`, `update`, ... record the outcome in the mapper and return
//!   `&mut Self` for chaining. Failures never escape; they are logged and
//!   readable through [`Mapper::last_error`].
//!
//! ```rust,no_run
//! use rowmap_core::{ConditionSet, Projection, QueryConfig, WhereGroup};
//! use rowmap_orm::{ConnectionConfig, Mapper};
//!
//! # async fn example() -> rowmap_orm::Result<()> {
//! let mut actors = Mapper::connect(&ConnectionConfig::new("sqlite:sakila.db"), "actor").await?;
//!
//! let config = QueryConfig::new()
//!     .where_group(WhereGroup::new(vec![ConditionSet::new().like("last_name", "%ER")]));
//! let count = actors.select(&Projection::All, &config).await.affected_row_count();
//!
//! if let Some(err) = actors.last_error() {
//!     eprintln!("{}: {err}", err.code());
//! }
//! # let _ = count;
//! # Ok(())
//! # }
//! ```

use chrono::Local;
use rowmap_core::{Assignments, FieldValue, Projection, QueryConfig, Statement, StatementBuilder};
use sqlx::sqlite::SqlitePool;
use tracing::{debug, info, warn};

use crate::config::{ConnectionConfig, DEFAULT_SCHEMA};
use crate::error::{MapperError, Result};
use crate::executor::{expand_time_macros, Executor, QueryOutput};
use crate::record::Record;
use crate::schema::{SchemaIntrospector, TableBinding};

/// State left behind by the last fluent call.
#[derive(Debug, Default)]
pub struct ExecutionResult {
    statement: Option<String>,
    row_count: u64,
    records: Option<Vec<Record>>,
    error: Option<MapperError>,
}

impl ExecutionResult {
    /// The executed SQL text, after time-macro expansion. `None` when the
    /// statement could not be built.
    #[must_use]
    pub fn statement(&self) -> Option<&str> {
        self.statement.as_deref()
    }

    /// Affected or returned rows; 0 after a failure.
    #[must_use]
    pub const fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Fetched rows; `None` after a write or a failure.
    #[must_use]
    pub fn records(&self) -> Option<&[Record]> {
        self.records.as_deref()
    }

    /// The recorded failure, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&MapperError> {
        self.error.as_ref()
    }

    /// Returns true if the call succeeded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Single-table data mapper over a backend client.
#[derive(Debug)]
pub struct Mapper<C> {
    client: C,
    schema: String,
    binding: TableBinding,
    last: ExecutionResult,
}

impl Mapper<SqlitePool> {
    /// Connects with `config` and binds `table`.
    pub async fn connect(config: &ConnectionConfig, table: &str) -> Result<Self> {
        let pool = config.connect().await?;
        let mut mapper = Self::new(pool).with_schema(&config.schema);
        mapper.set_table(table).await?;
        Ok(mapper)
    }
}

impl<C> Mapper<C>
where
    C: Executor + SchemaIntrospector,
{
    /// Creates an unbound mapper using the `main` schema.
    pub fn new(client: C) -> Self {
        Self {
            client,
            schema: String::from(DEFAULT_SCHEMA),
            binding: TableBinding::default(),
            last: ExecutionResult::default(),
        }
    }

    /// Sets the schema tables are looked up in.
    #[must_use]
    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = String::from(schema);
        self
    }

    /// Creates a mapper and binds `table`.
    pub async fn bind(client: C, table: &str) -> Result<Self> {
        let mut mapper = Self::new(client);
        mapper.set_table(table).await?;
        Ok(mapper)
    }

    /// Binds the mapper to `table`.
    ///
    /// The previous binding is dropped first, so after a failure the mapper
    /// is unbound and its columns and primary key are empty.
    pub async fn set_table(&mut self, table: &str) -> Result<()> {
        self.binding = TableBinding::default();
        let binding = self.client.describe(table, &self.schema).await?;
        info!(
            table = %binding.table,
            columns = binding.columns.len(),
            primary_key = ?binding.primary_key,
            "Bound table"
        );
        self.binding = binding;
        Ok(())
    }

    /// The bound table name; empty when unbound.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.binding.table
    }

    /// The bound table's columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.binding.columns
    }

    /// The bound table's primary key column.
    #[must_use]
    pub fn primary_key(&self) -> Option<&str> {
        self.binding.primary_key.as_deref()
    }

    /// The schema tables are looked up in.
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// The backend client.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// The outcome of the last fluent call.
    #[must_use]
    pub const fn last_result(&self) -> &ExecutionResult {
        &self.last
    }

    /// Rows affected or returned by the last fluent call.
    #[must_use]
    pub const fn affected_row_count(&self) -> u64 {
        self.last.row_count
    }

    /// Rows fetched by the last fluent call.
    #[must_use]
    pub fn records(&self) -> Option<&[Record]> {
        self.last.records()
    }

    /// The failure recorded by the last fluent call.
    #[must_use]
    pub const fn last_error(&self) -> Option<&MapperError> {
        self.last.error()
    }

    /// The SQL text executed by the last fluent call.
    #[must_use]
    pub fn statement(&self) -> Option<&str> {
        self.last.statement()
    }

    fn builder(&self) -> StatementBuilder<'_> {
        StatementBuilder::new(&self.binding.table)
    }

    /// Runs a SELECT and returns its rows.
    pub async fn try_select(
        &self,
        projection: &Projection,
        config: &QueryConfig,
    ) -> Result<QueryOutput> {
        let statement = self.builder().select(projection, config)?;
        self.execute(&statement).await.1
    }

    /// Runs an UPDATE and returns the affected-row count.
    pub async fn try_update(
        &self,
        assignments: &Assignments,
        config: &QueryConfig,
    ) -> Result<QueryOutput> {
        let statement = self.builder().update(assignments, config)?;
        self.execute(&statement).await.1
    }

    /// Runs an INSERT; `values` are positional and must line up with `columns`.
    pub async fn try_insert<S: AsRef<str>>(
        &self,
        columns: &[S],
        values: &[FieldValue],
    ) -> Result<QueryOutput> {
        let statement = self.builder().insert(columns, values)?;
        self.execute(&statement).await.1
    }

    /// Runs a DELETE and returns the affected-row count.
    pub async fn try_delete(&self, config: &QueryConfig) -> Result<QueryOutput> {
        let statement = self.builder().delete(config)?;
        self.execute(&statement).await.1
    }

    /// Fetches the rows holding the maximum value of `column`.
    pub async fn try_max_of(&self, column: &str) -> Result<QueryOutput> {
        let statement = self.builder().max_of(column)?;
        self.execute(&statement).await.1
    }

    /// Fetches the rows holding the minimum value of `column`.
    pub async fn try_min_of(&self, column: &str) -> Result<QueryOutput> {
        let statement = self.builder().min_of(column)?;
        self.execute(&statement).await.1
    }

    /// Runs a SELECT and records the outcome.
    pub async fn select(&mut self, projection: &Projection, config: &QueryConfig) -> &mut Self {
        let built = self.builder().select(projection, config);
        self.record(built).await
    }

    /// Runs an UPDATE and records the outcome.
    pub async fn update(&mut self, assignments: &Assignments, config: &QueryConfig) -> &mut Self {
        let built = self.builder().update(assignments, config);
        self.record(built).await
    }

    /// Runs an INSERT and records the outcome.
    pub async fn insert<S: AsRef<str>>(
        &mut self,
        columns: &[S],
        values: &[FieldValue],
    ) -> &mut Self {
        let built = self.builder().insert(columns, values);
        self.record(built).await
    }

    /// Runs a DELETE and records the outcome.
    pub async fn delete(&mut self, config: &QueryConfig) -> &mut Self {
        let built = self.builder().delete(config);
        self.record(built).await
    }

    /// Fetches the rows holding the maximum value of `column` and records
    /// the outcome.
    pub async fn max_of(&mut self, column: &str) -> &mut Self {
        let built = self.builder().max_of(column);
        self.record(built).await
    }

    /// Fetches the rows holding the minimum value of `column` and records
    /// the outcome.
    pub async fn min_of(&mut self, column: &str) -> &mut Self {
        let built = self.builder().min_of(column);
        self.record(built).await
    }

    /// Expands the time macros and executes. Returns the executed text
    /// alongside the outcome.
    async fn execute(&self, statement: &Statement) -> (String, Result<QueryOutput>) {
        let sql = expand_time_macros(statement.sql(), &Local::now());
        debug!(table = %self.binding.table, sql = %sql, "Executing statement");

        let outcome = self
            .client
            .execute(&sql, statement.is_fetch())
            .await
            .map(|mut output| {
                if let Some(records) = &output.records {
                    output.row_count = output.row_count.max(records.len() as u64);
                }
                output
            });
        if let Ok(output) = &outcome {
            debug!(row_count = output.row_count, "Statement executed");
        }
        (sql, outcome)
    }

    async fn record(&mut self, built: rowmap_core::error::Result<Statement>) -> &mut Self {
        self.last = ExecutionResult::default();

        let outcome = match built {
            Ok(statement) => {
                let (sql, outcome) = self.execute(&statement).await;
                self.last.statement = Some(sql);
                outcome
            }
            Err(err) => Err(MapperError::from(err)),
        };

        match outcome {
            Ok(output) => {
                self.last.row_count = output.row_count;
                self.last.records = output.records;
            }
            Err(err) => {
                warn!(
                    table = %self.binding.table,
                    code = err.code(),
                    error = %err,
                    "Statement failed"
                );
                self.last.error = Some(err);
            }
        }
        self
    }
}
