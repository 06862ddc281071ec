//! The service-backed table client.

use std::fmt;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use dynarchive_core::{ArchiveError, ArchiveResult, Connection, TableClient};
use dynarchive_model::input::{
    CreateTableInput, DescribeTableInput, PutItemInput, QueryInput, ScanInput,
};
use dynarchive_model::output::{
    CreateTableOutput, DescribeTableOutput, PutItemOutput, QueryOutput, ScanOutput,
};
use dynarchive_model::{ErrorCode, Item, TableOperation};
use tracing::debug;

use crate::convert::{
    ConversionError, attribute_definitions_to_sdk, conditions_to_sdk, consumed_capacity_from_sdk,
    item_from_sdk, item_to_sdk, key_schema_to_sdk, key_to_sdk, table_description_from_sdk,
    throughput_to_sdk,
};

/// Provider name attached to credentials taken from flags or the config file.
const CREDENTIALS_PROVIDER: &str = "dynarchive";

/// Build an SDK client for one side of a run.
///
/// Values missing from `connection` fall back to the SDK's default
/// credential, region and endpoint chains.
pub async fn connect(connection: &Connection) -> AwsTableClient {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &connection.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(creds) = &connection.credentials {
        loader = loader.credentials_provider(Credentials::new(
            creds.access_key_id.clone(),
            creds.secret_access_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER,
        ));
    }
    if let Some(endpoint) = &connection.endpoint_url {
        loader = loader.endpoint_url(endpoint.clone());
    }
    let sdk_config = loader.load().await;
    debug!(
        region = ?sdk_config.region(),
        endpoint = ?connection.endpoint_url,
        static_credentials = connection.credentials.is_some(),
        "connected"
    );
    AwsTableClient::new(Client::new(&sdk_config))
}

/// [`TableClient`] over `aws-sdk-dynamodb`.
#[derive(Clone)]
pub struct AwsTableClient {
    client: Client,
}

impl fmt::Debug for AwsTableClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsTableClient").finish_non_exhaustive()
    }
}

impl AwsTableClient {
    /// Wrap an existing SDK client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// The wrapped SDK client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Map an SDK failure to a remote error, keeping the service's code and
/// message when there is one.
fn remote_error<E, R>(operation: TableOperation, table: &str, err: &SdkError<E, R>) -> ArchiveError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: fmt::Debug,
{
    let code = err.code().map_or_else(
        || {
            ErrorCode::Unknown(
                match err {
                    SdkError::ConstructionFailure(_) => "ConstructionFailure",
                    SdkError::TimeoutError(_) => "TimeoutError",
                    SdkError::DispatchFailure(_) => "DispatchFailure",
                    SdkError::ResponseError(_) => "ResponseError",
                    _ => "ServiceError",
                }
                .to_owned(),
            )
        },
        ErrorCode::from_code,
    );
    let message = err
        .message()
        .map_or_else(|| DisplayErrorContext(err).to_string(), str::to_owned);
    ArchiveError::remote(operation, table, code, message)
}

#[allow(clippy::needless_pass_by_value)]
fn invalid_request(operation: TableOperation, err: BuildError) -> ArchiveError {
    ArchiveError::config(format!("invalid {operation} request: {err}"))
}

#[allow(clippy::needless_pass_by_value)]
fn unsupported_value(operation: TableOperation, table: &str, err: ConversionError) -> ArchiveError {
    ArchiveError::remote(
        operation,
        table,
        ErrorCode::Unknown("UnsupportedAttributeValue".to_owned()),
        err.to_string(),
    )
}

fn items_from_sdk(
    operation: TableOperation,
    table: &str,
    items: Option<Vec<std::collections::HashMap<String, aws_sdk_dynamodb::types::AttributeValue>>>,
) -> ArchiveResult<Vec<Item>> {
    items
        .unwrap_or_default()
        .into_iter()
        .map(|item| item_from_sdk(item).map_err(|e| unsupported_value(operation, table, e)))
        .collect()
}

#[async_trait]
impl TableClient for AwsTableClient {
    async fn describe_table(
        &self,
        input: DescribeTableInput,
    ) -> ArchiveResult<DescribeTableOutput> {
        let table = input.table_name;
        let output = self
            .client
            .describe_table()
            .table_name(&table)
            .send()
            .await
            .map_err(|e| remote_error(TableOperation::DescribeTable, &table, &e))?;
        Ok(DescribeTableOutput {
            table: output.table().map(table_description_from_sdk),
        })
    }

    async fn create_table(&self, input: CreateTableInput) -> ArchiveResult<CreateTableOutput> {
        let op = TableOperation::CreateTable;
        let table = input.table_name;
        let key_schema = key_schema_to_sdk(input.key_schema).map_err(|e| invalid_request(op, e))?;
        let definitions = attribute_definitions_to_sdk(input.attribute_definitions)
            .map_err(|e| invalid_request(op, e))?;
        let throughput = input
            .provisioned_throughput
            .map(throughput_to_sdk)
            .transpose()
            .map_err(|e| invalid_request(op, e))?;
        let output = self
            .client
            .create_table()
            .table_name(&table)
            .set_key_schema(Some(key_schema))
            .set_attribute_definitions(Some(definitions))
            .set_billing_mode(
                input
                    .billing_mode
                    .map(|m| aws_sdk_dynamodb::types::BillingMode::from(m.as_str())),
            )
            .set_provisioned_throughput(throughput)
            .send()
            .await
            .map_err(|e| remote_error(op, &table, &e))?;
        Ok(CreateTableOutput {
            table_description: output.table_description().map(table_description_from_sdk),
        })
    }

    async fn put_item(&self, input: PutItemInput) -> ArchiveResult<PutItemOutput> {
        let table = input.table_name;
        let output = self
            .client
            .put_item()
            .table_name(&table)
            .set_item(Some(item_to_sdk(input.item)))
            .set_return_consumed_capacity(input.return_consumed_capacity.map(|r| {
                aws_sdk_dynamodb::types::ReturnConsumedCapacity::from(r.as_str())
            }))
            .send()
            .await
            .map_err(|e| remote_error(TableOperation::PutItem, &table, &e))?;
        Ok(PutItemOutput {
            consumed_capacity: output.consumed_capacity().map(consumed_capacity_from_sdk),
        })
    }

    async fn scan(&self, input: ScanInput) -> ArchiveResult<ScanOutput> {
        let op = TableOperation::Scan;
        let table = input.table_name;
        let output = self
            .client
            .scan()
            .table_name(&table)
            .set_index_name(input.index_name)
            .set_limit(input.limit)
            .set_exclusive_start_key(key_to_sdk(input.exclusive_start_key))
            .set_return_consumed_capacity(input.return_consumed_capacity.map(|r| {
                aws_sdk_dynamodb::types::ReturnConsumedCapacity::from(r.as_str())
            }))
            .send()
            .await
            .map_err(|e| remote_error(op, &table, &e))?;
        let consumed_capacity = output.consumed_capacity().map(consumed_capacity_from_sdk);
        Ok(ScanOutput {
            count: output.count,
            scanned_count: output.scanned_count,
            last_evaluated_key: output
                .last_evaluated_key
                .map(item_from_sdk)
                .transpose()
                .map_err(|e| unsupported_value(op, &table, e))?
                .unwrap_or_default(),
            items: items_from_sdk(op, &table, output.items)?,
            consumed_capacity,
        })
    }

    async fn query(&self, input: QueryInput) -> ArchiveResult<QueryOutput> {
        let op = TableOperation::Query;
        let table = input.table_name;
        let conditions = conditions_to_sdk(input.key_conditions).map_err(|e| invalid_request(op, e))?;
        let output = self
            .client
            .query()
            .table_name(&table)
            .set_index_name(input.index_name)
            .set_key_conditions(Some(conditions))
            .set_limit(input.limit)
            .set_exclusive_start_key(key_to_sdk(input.exclusive_start_key))
            .set_return_consumed_capacity(input.return_consumed_capacity.map(|r| {
                aws_sdk_dynamodb::types::ReturnConsumedCapacity::from(r.as_str())
            }))
            .send()
            .await
            .map_err(|e| remote_error(op, &table, &e))?;
        let consumed_capacity = output.consumed_capacity().map(consumed_capacity_from_sdk);
        Ok(QueryOutput {
            count: output.count,
            scanned_count: output.scanned_count,
            last_evaluated_key: output
                .last_evaluated_key
                .map(item_from_sdk)
                .transpose()
                .map_err(|e| unsupported_value(op, &table, e))?
                .unwrap_or_default(),
            items: items_from_sdk(op, &table, output.items)?,
            consumed_capacity,
        })
    }
}
