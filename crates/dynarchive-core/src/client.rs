//! The remote table service as seen by the tools.

use async_trait::async_trait;
use dynarchive_model::TableOperation;
use dynarchive_model::input::{
    CreateTableInput, DescribeTableInput, PutItemInput, QueryInput, ScanInput,
};
use dynarchive_model::output::{
    CreateTableOutput, DescribeTableOutput, PutItemOutput, QueryOutput, ScanOutput,
};
use dynarchive_model::types::TableDescription;

use crate::error::{ArchiveError, ArchiveResult};

/// The subset of DynamoDB the tools consume.
///
/// Each call either completes or fails; implementations never retry.
#[async_trait]
pub trait TableClient: Send + Sync {
    /// Read a table's metadata.
    async fn describe_table(&self, input: DescribeTableInput)
    -> ArchiveResult<DescribeTableOutput>;

    /// Create a table.
    async fn create_table(&self, input: CreateTableInput) -> ArchiveResult<CreateTableOutput>;

    /// Write one item.
    async fn put_item(&self, input: PutItemInput) -> ArchiveResult<PutItemOutput>;

    /// Read one page of the whole table.
    async fn scan(&self, input: ScanInput) -> ArchiveResult<ScanOutput>;

    /// Read one page of items matching key conditions.
    async fn query(&self, input: QueryInput) -> ArchiveResult<QueryOutput>;

    /// Describe a table, treating an answer without a description as
    /// missing data.
    async fn table_description(&self, table_name: &str) -> ArchiveResult<TableDescription> {
        let output = self
            .describe_table(DescribeTableInput {
                table_name: table_name.to_owned(),
            })
            .await?;
        output
            .table
            .ok_or_else(|| ArchiveError::missing_data(TableOperation::DescribeTable, table_name))
    }
}
