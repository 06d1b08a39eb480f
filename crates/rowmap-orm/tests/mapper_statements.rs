//! Tests for the exact statement text the mapper hands to its executor.

mod common;
use common::*;

use chrono::Local;
use rowmap_core::{
    Assignments, ConditionSet, FieldValue, Limit, Projection, QueryConfig, SqlValue, WhereGroup,
};
use rowmap_orm::{Mapper, QueryOutput, Record};

async fn customer_mapper(client: RecordingClient) -> Mapper<RecordingClient> {
    init_tracing();
    Mapper::bind(client, "customer").await.unwrap()
}

fn customer_client() -> RecordingClient {
    RecordingClient::for_table("customer", &["id", "email", "updated_at"], Some("id"))
}

#[tokio::test]
async fn raw_now_becomes_unquoted_date() {
    let mut mapper = customer_mapper(customer_client()).await;
    let today = Local::now().format("%Y-%m-%d").to_string();

    mapper
        .update(
            &Assignments::new().set_raw("updated_at", "NOW()"),
            &QueryConfig::new().where_group(WhereGroup::new(vec![ConditionSet::new().eq("id", 3)])),
        )
        .await;

    let expected = format!("UPDATE `customer` SET `updated_at` = {today} WHERE (`id` = 3 );");
    assert_eq!(mapper.client().last_sql(), expected);
    assert_eq!(mapper.statement(), Some(expected.as_str()));
    assert_eq!(mapper.affected_row_count(), 1);
}

#[tokio::test]
async fn raw_time_becomes_datetime() {
    let mut mapper = customer_mapper(customer_client()).await;
    mapper
        .update(
            &Assignments::new().set_raw("updated_at", "TIME()"),
            &QueryConfig::new(),
        )
        .await;
    let sql = mapper.client().last_sql();
    let stamp = sql
        .strip_prefix("UPDATE `customer` SET `updated_at` = ")
        .and_then(|rest| rest.strip_suffix(';'))
        .unwrap();
    assert!(chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").is_ok());
}

#[tokio::test]
async fn insert_sends_documented_shape() {
    let mut mapper = customer_mapper(customer_client()).await;
    mapper
        .insert(&["id", "email"], &[FieldValue::from("1"), FieldValue::from("a@example.org")])
        .await;
    assert_eq!(
        mapper.client().sent(),
        vec![(
            String::from("INSERT INTO `customer` (id,email) VALUES ('1', 'a@example.org')"),
            false
        )]
    );
}

#[tokio::test]
async fn delete_with_non_numeric_limit() {
    let mut mapper = customer_mapper(customer_client()).await;
    let config: QueryConfig = serde_json::from_str(r#"{"LIMIT": "abc"}"#).unwrap();
    mapper.delete(&config).await;
    assert_eq!(mapper.client().last_sql(), "DELETE FROM `customer` LIMIT 0;");
}

#[tokio::test]
async fn select_is_sent_as_fetch() {
    let mut mapper = customer_mapper(customer_client()).await;
    mapper.select(&Projection::All, &QueryConfig::new()).await;
    mapper.max_of("id").await;
    assert_eq!(
        mapper.client().sent(),
        vec![
            (String::from("SELECT  * FROM `customer`  LIMIT 0, 1000;"), true),
            (
                String::from(concat!(
                    "SELECT * FROM `customer` WHERE `id` = ",
                    "(SELECT MAX(`id`) FROM `customer`)"
                )),
                true
            ),
        ]
    );
}

#[tokio::test]
async fn fetch_count_falls_back_to_records() {
    let record = Record::new(vec![(String::from("id"), SqlValue::Int(1))]);
    let client = customer_client().fetching(QueryOutput {
        row_count: 0,
        records: Some(vec![record.clone(), record]),
    });
    let mut mapper = customer_mapper(client).await;
    mapper.select(&Projection::All, &QueryConfig::new()).await;
    assert_eq!(mapper.affected_row_count(), 2);
}

#[tokio::test]
async fn execution_failure_is_recorded() {
    let mut mapper = customer_mapper(customer_client().failing("database is locked")).await;
    mapper.min_of("id").await;

    let result = mapper.last_result();
    assert!(!result.is_ok());
    assert_eq!(result.error().unwrap().code(), "ERROR_EXECUTING_QUERY");
    assert_eq!(result.records(), None);
    assert_eq!(result.row_count(), 0);
    assert_eq!(
        result.statement(),
        Some("SELECT * FROM `customer` WHERE `id` = (SELECT MIN(`id`) FROM `customer`)")
    );

    let err = mapper.try_min_of("id").await.unwrap_err();
    assert_eq!(err.to_string(), "error executing query: database is locked");
}

#[tokio::test]
async fn build_failure_sends_nothing() {
    let mut mapper = customer_mapper(customer_client()).await;
    mapper
        .delete(&QueryConfig::new().limit(Limit::range(0, 10)))
        .await;
    assert_eq!(mapper.last_error().unwrap().code(), "BUILD_ERROR");
    assert_eq!(mapper.statement(), None);
    assert!(mapper.client().sent().is_empty());
}

#[tokio::test]
async fn rebinding_an_unknown_table_unbinds() {
    let mut mapper = customer_mapper(customer_client()).await;
    assert_eq!(mapper.primary_key(), Some("id"));

    assert!(mapper.set_table("orders").await.is_err());
    assert!(mapper.columns().is_empty());
    assert_eq!(mapper.primary_key(), None);
}

#[tokio::test]
async fn custom_schema_is_kept() {
    init_tracing();
    let mapper = Mapper::new(customer_client()).with_schema("archive");
    assert_eq!(mapper.schema(), "archive");
    assert_eq!(mapper.table(), "");
}
