//! Table introspection.

use std::future::Future;

use sqlx::sqlite::SqlitePool;

use crate::error::{MapperError, Result};

/// A physical table bound to a mapper: its columns in declaration order
/// and its primary key, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableBinding {
    /// Table name.
    pub table: String,
    /// Column names in declaration order.
    pub columns: Vec<String>,
    /// Primary key column.
    pub primary_key: Option<String>,
}

/// Describes tables of a backend.
pub trait SchemaIntrospector {
    /// Looks up the columns and primary key of `table` in `schema`.
    ///
    /// Fails with [`MapperError::SchemaNotFound`] when no columns are found.
    fn describe(
        &self,
        table: &str,
        schema: &str,
    ) -> impl Future<Output = Result<TableBinding>> + Send;
}

const TABLE_INFO_SQL: &str = "SELECT name, pk FROM pragma_table_info(?1, ?2) ORDER BY cid";

impl SchemaIntrospector for SqlitePool {
    async fn describe(&self, table: &str, schema: &str) -> Result<TableBinding> {
        let rows: Vec<(String, i64)> = sqlx::query_as(TABLE_INFO_SQL)
            .bind(table)
            .bind(schema)
            .fetch_all(self)
            .await?;

        if rows.is_empty() {
            return Err(MapperError::SchemaNotFound {
                table: String::from(table),
            });
        }

        let primary_key = rows
            .iter()
            .find(|(_, pk)| *pk == 1)
            .map(|(name, _)| name.clone());
        Ok(TableBinding {
            table: String::from(table),
            columns: rows.into_iter().map(|(name, _)| name).collect(),
            primary_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool");
        sqlx::query(
            "CREATE TABLE actor (actor_id INTEGER PRIMARY KEY, first_name TEXT NOT NULL, \
             last_name TEXT NOT NULL)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("CREATE TABLE tag (label TEXT)")
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    #[tokio::test]
    async fn test_describe_actor() {
        let pool = create_test_pool().await;
        let binding = pool.describe("actor", "main").await.unwrap();
        assert_eq!(binding.table, "actor");
        assert_eq!(binding.columns, vec!["actor_id", "first_name", "last_name"]);
        assert_eq!(binding.primary_key.as_deref(), Some("actor_id"));
    }

    #[tokio::test]
    async fn test_describe_without_primary_key() {
        let pool = create_test_pool().await;
        let binding = pool.describe("tag", "main").await.unwrap();
        assert_eq!(binding.columns, vec!["label"]);
        assert_eq!(binding.primary_key, None);
    }

    #[tokio::test]
    async fn test_describe_missing_table() {
        let pool = create_test_pool().await;
        let err = pool.describe("ghost", "main").await.unwrap_err();
        assert!(matches!(err, MapperError::SchemaNotFound { ref table } if table == "ghost"));
    }
}
