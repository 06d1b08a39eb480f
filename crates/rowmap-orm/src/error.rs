//! Error types for the mapper.

use rowmap_core::BuildError;
use thiserror::Error;

/// Mapper errors.
#[derive(Debug, Error)]
pub enum MapperError {
    /// The backend could not be reached or the connection settings are invalid.
    #[error("could not connect to the database: {0}")]
    Connection(String),

    /// Introspection returned no columns for the table.
    #[error("no schema found for table '{table}'")]
    SchemaNotFound {
        /// The table that was looked up.
        table: String,
    },

    /// The backend rejected the statement.
    #[error("error executing query: {0}")]
    Execution(String),

    /// Lower-level failure from the driver.
    #[error("driver error: {0}")]
    Driver(sqlx::Error),

    /// The configuration could not be turned into a statement.
    #[error("could not build statement: {0}")]
    Build(#[from] BuildError),
}

impl MapperError {
    /// Returns a stable code identifying the error kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Connection(_) => "DB_CONNECT_ERROR",
            Self::SchemaNotFound { .. } => "SCHEMA_NOT_FOUND",
            Self::Execution(_) => "ERROR_EXECUTING_QUERY",
            Self::Driver(_) => "DRIVER_ERROR",
            Self::Build(_) => "BUILD_ERROR",
        }
    }
}

impl From<sqlx::Error> for MapperError {
    /// Errors reported by the database itself are execution errors; anything
    /// else stays a driver error.
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => Self::Execution(db.message().to_string()),
            other => Self::Driver(other),
        }
    }
}

/// Result type alias for mapper operations.
pub type Result<T> = std::result::Result<T, MapperError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rowmap_core::StatementKind;

    #[test]
    fn test_codes() {
        assert_eq!(MapperError::Connection(String::from("x")).code(), "DB_CONNECT_ERROR");
        assert_eq!(
            MapperError::SchemaNotFound {
                table: String::from("ghost")
            }
            .code(),
            "SCHEMA_NOT_FOUND"
        );
        assert_eq!(MapperError::Execution(String::from("x")).code(), "ERROR_EXECUTING_QUERY");
        assert_eq!(MapperError::from(sqlx::Error::RowNotFound).code(), "DRIVER_ERROR");
        assert_eq!(
            MapperError::from(BuildError::InvalidLimit(StatementKind::Delete)).code(),
            "BUILD_ERROR"
        );
    }

    #[test]
    fn test_messages() {
        let err = MapperError::SchemaNotFound {
            table: String::from("ghost"),
        };
        assert_eq!(err.to_string(), "no schema found for table 'ghost'");
        let err = MapperError::from(BuildError::MissingTable);
        assert_eq!(err.to_string(), "could not build statement: no table bound");
    }
}
