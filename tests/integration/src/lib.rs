//! Integration tests for the table tools.
//!
//! These tests require a DynamoDB-compatible endpoint, by default
//! `localhost:4566`. They are marked `#[ignore]` so they don't run during
//! normal `cargo test`.
//!
//! Run them with:
//! ```text
//! DYNAMODB_ENDPOINT_URL=http://localhost:8000 cargo test -p dynarchive-integration -- --ignored
//! ```

use std::sync::Once;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType,
    ProvisionedThroughput, ScalarAttributeType,
};
use dynarchive_aws::AwsTableClient;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL of the server under test.
fn endpoint_url() -> String {
    std::env::var("DYNAMODB_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:4566".to_owned())
}

/// Create an SDK client pointing at the server under test.
#[must_use]
pub fn dynamodb_client() -> aws_sdk_dynamodb::Client {
    init_tracing();

    let creds = Credentials::new("test", "test", None, None, "integration-test");

    let config = aws_sdk_dynamodb::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(creds)
        .endpoint_url(endpoint_url())
        .build();

    aws_sdk_dynamodb::Client::from_conf(config)
}

/// Wrap an SDK client as a table client.
#[must_use]
pub fn table_client(client: &aws_sdk_dynamodb::Client) -> AwsTableClient {
    AwsTableClient::new(client.clone())
}

/// Generate a unique table name for a test.
#[must_use]
pub fn test_table_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// Create a provisioned table keyed by `pk` (and `sk` when `with_sort_key`).
pub async fn create_table(
    client: &aws_sdk_dynamodb::Client,
    table_name: &str,
    with_sort_key: bool,
    capacity: i64,
) {
    let mut req = client
        .create_table()
        .table_name(table_name)
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name("pk")
                .key_type(KeyType::Hash)
                .build()
                .unwrap(),
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name("pk")
                .attribute_type(ScalarAttributeType::S)
                .build()
                .unwrap(),
        )
        .billing_mode(BillingMode::Provisioned)
        .provisioned_throughput(
            ProvisionedThroughput::builder()
                .read_capacity_units(capacity)
                .write_capacity_units(capacity)
                .build()
                .unwrap(),
        );
    if with_sort_key {
        req = req
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name("sk")
                    .key_type(KeyType::Range)
                    .build()
                    .unwrap(),
            )
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name("sk")
                    .attribute_type(ScalarAttributeType::N)
                    .build()
                    .unwrap(),
            );
    }
    req.send()
        .await
        .unwrap_or_else(|e| panic!("failed to create table {table_name}: {e}"));
}

/// Put `count` items; with a sort key they share partition `p`.
pub async fn seed_items(
    client: &aws_sdk_dynamodb::Client,
    table_name: &str,
    count: u32,
    with_sort_key: bool,
) {
    for n in 0..count {
        let mut req = client
            .put_item()
            .table_name(table_name)
            .item("payload", AttributeValue::S(format!("value-{n}")))
            .item("flag", AttributeValue::Bool(n % 2 == 0));
        req = if with_sort_key {
            req.item("pk", AttributeValue::S("p".to_owned()))
                .item("sk", AttributeValue::N(n.to_string()))
        } else {
            req.item("pk", AttributeValue::S(format!("item-{n:03}")))
        };
        req.send()
            .await
            .unwrap_or_else(|e| panic!("failed to seed {table_name}: {e}"));
    }
}

/// Count the items of a table with an unpaced scan.
pub async fn count_items(client: &aws_sdk_dynamodb::Client, table_name: &str) -> usize {
    let mut total = 0;
    let mut start = None;
    loop {
        let resp = client
            .scan()
            .table_name(table_name)
            .set_exclusive_start_key(start.take())
            .send()
            .await
            .unwrap_or_else(|e| panic!("failed to scan {table_name}: {e}"));
        total += resp.items().len();
        match resp.last_evaluated_key {
            Some(key) if !key.is_empty() => start = Some(key),
            _ => break,
        }
    }
    total
}

/// Delete tables, ignoring failures.
pub async fn cleanup_tables(client: &aws_sdk_dynamodb::Client, tables: &[&str]) {
    for table in tables {
        let _ = client.delete_table().table_name(*table).send().await;
    }
}

mod test_copy;
mod test_archive;
