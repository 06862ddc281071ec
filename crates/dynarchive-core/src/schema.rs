//! Copying a table's structure to a new table.
//!
//! Only the key schema and the attribute definitions are carried over.
//! Capacity is copied as provisioned throughput, with at least one unit on
//! each side so on-demand sources still produce a valid request.

use dynarchive_model::input::CreateTableInput;
use dynarchive_model::types::{BillingMode, ProvisionedThroughput, TableDescription};
use tracing::info;

use crate::client::TableClient;
use crate::error::ArchiveResult;

/// Build the `CreateTable` request that clones `source` as `dest_table`.
#[must_use]
pub fn create_table_input(source: &TableDescription, dest_table: &str) -> CreateTableInput {
    let units = |capacity: u64| i64::try_from(capacity).unwrap_or(i64::MAX).max(1);
    CreateTableInput {
        table_name: dest_table.to_owned(),
        key_schema: source.key_schema.clone(),
        attribute_definitions: source.attribute_definitions.clone(),
        billing_mode: Some(BillingMode::Provisioned),
        provisioned_throughput: Some(ProvisionedThroughput {
            read_capacity_units: units(source.read_capacity_units()),
            write_capacity_units: units(source.write_capacity_units()),
        }),
    }
}

/// Describe `src_table` through `source` and create `dest_table` with the
/// same structure through `dest`.
///
/// Returns the description of the new table as reported by the service.
pub async fn copy_structure<S, D>(
    source: &S,
    src_table: &str,
    dest: &D,
    dest_table: &str,
) -> ArchiveResult<Option<TableDescription>>
where
    S: TableClient + ?Sized,
    D: TableClient + ?Sized,
{
    let description = source.table_description(src_table).await?;
    let input = create_table_input(&description, dest_table);
    info!(
        source = src_table,
        dest = dest_table,
        keys = input.key_schema.len(),
        attributes = input.attribute_definitions.len(),
        "creating table"
    );
    let output = dest.create_table(input).await?;
    Ok(output.table_description)
}
