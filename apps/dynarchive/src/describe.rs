//! `dynamo-describe`: print a table's description.

use anyhow::{Context, Result};
use clap::Parser;
use dynarchive_aws::connect;
use dynarchive_core::{ArchiveResult, TableClient};

use crate::cli::{GlobalOptions, TableConnection};

/// Print the description of a DynamoDB table as JSON.
#[derive(Debug, Parser)]
#[allow(missing_docs)]
#[command(name = "dynamo-describe", version, about)]
pub struct Options {
    /// Table to describe
    #[arg(long)]
    pub table: String,

    #[command(flatten)]
    pub connection: TableConnection,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Describe `table` and render the description as pretty JSON.
pub async fn describe<C: TableClient + ?Sized>(client: &C, table: &str) -> ArchiveResult<String> {
    let description = client.table_description(table).await?;
    Ok(serde_json::to_string_pretty(&description)?)
}

/// Describe the table and print the result.
pub async fn run(opts: &Options) -> Result<()> {
    let file = opts.global.load_config()?;
    let client = connect(&opts.connection.resolve(&file, file.srcenv.as_deref())?).await;
    let rendered = describe(&client, &opts.table)
        .await
        .with_context(|| format!("failed to describe {}", opts.table))?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use dynarchive_core::ArchiveError;
    use dynarchive_core::memory::MemoryTableClient;
    use dynarchive_model::AttributeValue;

    use super::*;

    #[tokio::test]
    async fn test_should_render_description_as_json() {
        let client = MemoryTableClient::new();
        client.add_table("Orders", "id", 7, 2);
        client
            .insert(
                "Orders",
                HashMap::from([("id".to_owned(), AttributeValue::S("a".to_owned()))]),
            )
            .expect("insert");

        let rendered = describe(&client, "Orders").await.expect("describe");
        let json: serde_json::Value = serde_json::from_str(&rendered).expect("json");

        assert_eq!(json["TableName"], "Orders");
        assert_eq!(json["ItemCount"], 1);
        assert_eq!(json["ProvisionedThroughput"]["ReadCapacityUnits"], 7);
        assert_eq!(json["KeySchema"][0]["AttributeName"], "id");
    }

    #[tokio::test]
    async fn test_should_fail_on_blank_description() {
        let client = MemoryTableClient::new();
        client.add_table("Orders", "id", 1, 1);
        client.blank_describe("Orders");
        let err = describe(&client, "Orders").await.unwrap_err();
        assert!(matches!(err, ArchiveError::MissingData { .. }));
    }
}
