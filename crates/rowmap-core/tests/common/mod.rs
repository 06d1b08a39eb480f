#![allow(dead_code)]

use rowmap_core::{BuildError, FieldSpec, Projection, QueryConfig, StatementBuilder, StatementKind};

pub fn config(json: &str) -> QueryConfig {
    serde_json::from_str(json)
        .unwrap_or_else(|e| panic!("Failed to parse config: {json}\nError: {e}"))
}

pub fn build(table: &str, kind: StatementKind, fields: &FieldSpec, config: &QueryConfig) -> String {
    StatementBuilder::new(table)
        .build(kind, fields, config)
        .unwrap_or_else(|e| panic!("Failed to build {kind} on {table}\nError: {e}"))
        .into_sql()
}

pub fn build_err(
    table: &str,
    kind: StatementKind,
    fields: &FieldSpec,
    config: &QueryConfig,
) -> BuildError {
    StatementBuilder::new(table)
        .build(kind, fields, config)
        .expect_err(&format!("Expected build error for {kind} on {table}"))
}

pub fn select_all(table: &str, config: &QueryConfig) -> String {
    build(table, StatementKind::Select, &FieldSpec::Projection(Projection::All), config)
}

/// Returns true if every `(` is closed and no prefix closes more than it opens.
pub fn balanced(sql: &str) -> bool {
    let mut depth = 0_i32;
    for c in sql.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}
