//! Connection settings and pool bootstrap.

use std::str::FromStr;

use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::error::{MapperError, Result};

/// Schema name used when none is configured.
pub const DEFAULT_SCHEMA: &str = "main";

/// Pool size used when none is configured.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 1;

/// Where and how to connect.
///
/// ```rust
/// use rowmap_orm::ConnectionConfig;
///
/// let config: ConnectionConfig =
///     serde_json::from_str(r#"{"url": "sqlite:sakila.db"}"#).unwrap();
/// assert_eq!(config.schema, "main");
/// assert_eq!(config.max_connections, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    /// Database URL, e.g. `sqlite:sakila.db` or `sqlite::memory:`.
    pub url: String,
    /// Schema the tables are looked up in.
    #[serde(default = "default_schema")]
    pub schema: String,
    /// Upper bound of pooled connections. An in-memory database must use 1.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_schema() -> String {
    String::from(DEFAULT_SCHEMA)
}

const fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

impl ConnectionConfig {
    /// Creates a configuration with the default schema and pool size.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            schema: default_schema(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Sets the schema name.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Sets the pool size.
    #[must_use]
    pub const fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Reads `DATABASE_URL`, `ROWMAP_SCHEMA` and `ROWMAP_MAX_CONNECTIONS`.
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| MapperError::Connection(String::from("DATABASE_URL is not set")))?;
        let mut config = Self::new(url);

        if let Ok(schema) = std::env::var("ROWMAP_SCHEMA") {
            config.schema = schema;
        }
        if let Ok(max) = std::env::var("ROWMAP_MAX_CONNECTIONS") {
            config.max_connections = max.trim().parse().map_err(|_| {
                MapperError::Connection(format!("invalid ROWMAP_MAX_CONNECTIONS '{max}'"))
            })?;
        }
        Ok(config)
    }

    /// Opens a persistent pool: idle connections are never closed and never
    /// recycled by age.
    pub async fn connect(&self) -> Result<SqlitePool> {
        if !self.url.starts_with("sqlite:") {
            return Err(MapperError::Connection(format!(
                "unsupported database url '{}', expected sqlite:",
                self.url
            )));
        }
        if self.max_connections == 0 {
            return Err(MapperError::Connection(String::from(
                "max_connections must be at least 1",
            )));
        }

        let options = SqliteConnectOptions::from_str(&self.url)
            .map_err(|e| MapperError::Connection(e.to_string()))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| MapperError::Connection(e.to_string()))?;

        info!(
            url = %self.url,
            schema = %self.schema,
            max_connections = self.max_connections,
            "Connected to database"
        );
        Ok(pool)
    }
}
