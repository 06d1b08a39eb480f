#![allow(dead_code)]

use std::sync::Mutex;

use rowmap_orm::{
    Executor, MapperError, QueryOutput, Record, Result, SchemaIntrospector, TableBinding,
};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

const SEED_SQL: &[&str] = &[
    "CREATE TABLE actor (actor_id INTEGER PRIMARY KEY, first_name TEXT NOT NULL, \
     last_name TEXT NOT NULL, last_update TEXT)",
    "CREATE TABLE film (film_id INTEGER PRIMARY KEY, title TEXT NOT NULL, \
     rental_rate REAL NOT NULL)",
    "CREATE TABLE film_actor (actor_id INTEGER NOT NULL, film_id INTEGER NOT NULL, \
     PRIMARY KEY (actor_id, film_id))",
    "INSERT INTO actor (actor_id, first_name, last_name) VALUES \
     (1, 'PENELOPE', 'GUINESS'), (2, 'NICK', 'WAHLBERG'), (3, 'ED', 'CHASE'), \
     (4, 'JENNIFER', 'DAVIS'), (5, 'JOHNNY', 'LOLLOBRIGIDA')",
    "INSERT INTO film (film_id, title, rental_rate) VALUES \
     (1, 'ACADEMY DINOSAUR', 0.99), (2, 'ACE GOLDFINGER', 4.99), (3, 'ADAPTATION HOLES', 2.99)",
    "INSERT INTO film_actor (actor_id, film_id) VALUES (1, 1), (1, 3), (2, 3), (4, 2)",
];

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// In-memory database holding a small slice of the sakila sample schema.
pub async fn create_test_pool() -> SqlitePool {
    init_tracing();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");
    for sql in SEED_SQL {
        sqlx::query(sql)
            .execute(&pool)
            .await
            .unwrap_or_else(|e| panic!("Failed to seed: {sql}\nError: {e}"));
    }
    pool
}

pub fn ids(records: &[Record]) -> Vec<i64> {
    let mut ids: Vec<i64> = records
        .iter()
        .map(|r| match r.get("actor_id") {
            Some(rowmap_core::SqlValue::Int(id)) => *id,
            other => panic!("Expected integer actor_id, got {other:?}"),
        })
        .collect();
    ids.sort_unstable();
    ids
}

/// Client that records every statement instead of running it.
#[derive(Debug, Default)]
pub struct RecordingClient {
    pub binding: TableBinding,
    pub sent: Mutex<Vec<(String, bool)>>,
    pub fetch_output: Option<QueryOutput>,
    pub failure: Option<String>,
}

impl RecordingClient {
    pub fn for_table(table: &str, columns: &[&str], primary_key: Option<&str>) -> Self {
        Self {
            binding: TableBinding {
                table: String::from(table),
                columns: columns.iter().map(|c| String::from(*c)).collect(),
                primary_key: primary_key.map(String::from),
            },
            ..Self::default()
        }
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(String::from(message));
        self
    }

    pub fn fetching(mut self, output: QueryOutput) -> Self {
        self.fetch_output = Some(output);
        self
    }

    pub fn sent(&self) -> Vec<(String, bool)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_sql(&self) -> String {
        self.sent()
            .last()
            .map(|(sql, _)| sql.clone())
            .expect("Expected at least one statement")
    }
}

impl Executor for RecordingClient {
    async fn execute(&self, sql: &str, fetch: bool) -> Result<QueryOutput> {
        self.sent.lock().unwrap().push((String::from(sql), fetch));
        if let Some(message) = &self.failure {
            return Err(MapperError::Execution(message.clone()));
        }
        Ok(if fetch {
            self.fetch_output
                .clone()
                .unwrap_or_else(|| QueryOutput::fetched(vec![]))
        } else {
            QueryOutput::affected(1)
        })
    }
}

impl SchemaIntrospector for RecordingClient {
    async fn describe(&self, table: &str, _schema: &str) -> Result<TableBinding> {
        if table == self.binding.table {
            Ok(self.binding.clone())
        } else {
            Err(MapperError::SchemaNotFound {
                table: String::from(table),
            })
        }
    }
}
