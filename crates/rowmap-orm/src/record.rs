//! Rows materialized from fetch statements.

use rowmap_core::SqlValue;
use serde::ser::{Serialize, SerializeMap, Serializer};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// One fetched row: column names and values in backend order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, SqlValue)>,
}

impl Record {
    /// Creates a record from ordered `(column, value)` pairs.
    #[must_use]
    pub fn new(fields: Vec<(String, SqlValue)>) -> Self {
        Self { fields }
    }

    /// Returns the value of a column. The first match wins when a join
    /// yields duplicate column names.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Returns the column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Returns the `(column, value)` pairs in order.
    pub fn iter(&self) -> std::slice::Iter<'_, (String, SqlValue)> {
        self.fields.iter()
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Converts the record into a JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(name, value)| (name.clone(), value_to_json(value)))
                .collect(),
        )
    }

    /// Decodes a row by the storage class of each value.
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let mut fields = Vec::with_capacity(row.columns().len());
        for column in row.columns() {
            let index = column.ordinal();
            let raw = row.try_get_raw(index)?;
            let value = if raw.is_null() {
                SqlValue::Null
            } else {
                match raw.type_info().name() {
                    "INTEGER" => SqlValue::Int(row.try_get_unchecked(index)?),
                    "REAL" => SqlValue::Float(row.try_get_unchecked(index)?),
                    "BLOB" => SqlValue::Blob(row.try_get_unchecked(index)?),
                    _ => SqlValue::Text(row.try_get_unchecked(index)?),
                }
            };
            fields.push((column.name().to_string(), value));
        }
        Ok(Self { fields })
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a (String, SqlValue);
    type IntoIter = std::slice::Iter<'a, (String, SqlValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

fn value_to_json(value: &SqlValue) -> serde_json::Value {
    match value {
        SqlValue::Null => serde_json::Value::Null,
        SqlValue::Bool(b) => serde_json::Value::Bool(*b),
        SqlValue::Int(n) => serde_json::Value::from(*n),
        SqlValue::Float(f) => serde_json::Value::from(*f),
        SqlValue::Text(s) => serde_json::Value::String(s.clone()),
        SqlValue::Blob(bytes) => serde_json::Value::from(bytes.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[test]
    fn test_lookup_and_order() {
        let record = Record::new(vec![
            (String::from("id"), SqlValue::Int(1)),
            (String::from("name"), SqlValue::Text(String::from("PENELOPE"))),
            (String::from("id"), SqlValue::Int(9)),
        ]);
        assert_eq!(record.get("id"), Some(&SqlValue::Int(1)));
        assert_eq!(record.get("missing"), None);
        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["id", "name", "id"]);
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_to_json() {
        let record = Record::new(vec![
            (String::from("id"), SqlValue::Int(1)),
            (String::from("score"), SqlValue::Float(2.5)),
            (String::from("note"), SqlValue::Null),
        ]);
        assert_eq!(
            record.to_json(),
            serde_json::json!({"id": 1, "score": 2.5, "note": null})
        );
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"id":1,"score":2.5,"note":null}"#
        );
    }

    #[tokio::test]
    async fn test_from_row_storage_classes() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool");
        let row = sqlx::query("SELECT 1 AS i, 1.5 AS r, 'x' AS t, x'0102' AS b, NULL AS n")
            .fetch_one(&pool)
            .await
            .unwrap();
        let record = Record::from_row(&row).unwrap();
        assert_eq!(
            record,
            Record::new(vec![
                (String::from("i"), SqlValue::Int(1)),
                (String::from("r"), SqlValue::Float(1.5)),
                (String::from("t"), SqlValue::Text(String::from("x"))),
                (String::from("b"), SqlValue::Blob(vec![1, 2])),
                (String::from("n"), SqlValue::Null),
            ])
        );
    }
}
