//! In-process [`TableClient`] for tests and dry runs.
//!
//! Tables keep their items in a `BTreeMap` ordered by the JSON encoding of
//! the primary key, so scans are deterministic and continuation keys behave
//! like the service's: a page stops after `Limit` items and reports the key
//! of its last item when more items follow.
//!
//! Every call made through the [`TableClient`] trait is recorded, and the
//! n-th `PutItem` can be made to fail.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;

use async_trait::async_trait;
use dynarchive_model::input::{
    CreateTableInput, DescribeTableInput, PutItemInput, QueryInput, ScanInput,
};
use dynarchive_model::output::{
    CreateTableOutput, DescribeTableOutput, PutItemOutput, QueryOutput, ScanOutput,
};
use dynarchive_model::types::{
    AttributeDefinition, ComparisonOperator, KeySchemaElement, KeyType,
    ProvisionedThroughputDescription, ScalarAttributeType, TableDescription, TableStatus,
};
use dynarchive_model::{AttributeValue, ErrorCode, Item, Key, TableOperation};
use parking_lot::Mutex;
use tracing::debug;

use crate::client::TableClient;
use crate::error::{ArchiveError, ArchiveResult};

/// A request received by [`MemoryTableClient`].
#[derive(Debug, Clone)]
pub enum RecordedRequest {
    /// `DescribeTable`.
    DescribeTable(DescribeTableInput),
    /// `CreateTable`.
    CreateTable(CreateTableInput),
    /// `PutItem`.
    PutItem(PutItemInput),
    /// `Scan`.
    Scan(ScanInput),
    /// `Query`.
    Query(QueryInput),
}

#[derive(Debug)]
struct MemoryTable {
    description: TableDescription,
    key_names: Vec<String>,
    items: BTreeMap<String, Item>,
}

impl MemoryTable {
    fn new(description: TableDescription) -> Self {
        let mut key_names: Vec<String> = Vec::new();
        for key_type in [KeyType::Hash, KeyType::Range] {
            key_names.extend(
                description
                    .key_schema
                    .iter()
                    .filter(|k| k.key_type == key_type)
                    .map(|k| k.attribute_name.clone()),
            );
        }
        Self {
            description,
            key_names,
            items: BTreeMap::new(),
        }
    }

    fn name(&self) -> &str {
        self.description.table_name.as_deref().unwrap_or_default()
    }

    fn key_of(&self, item: &Item) -> Key {
        self.key_names
            .iter()
            .filter_map(|name| item.get(name).map(|v| (name.clone(), v.clone())))
            .collect()
    }

    fn storage_key(&self, operation: TableOperation, item: &Item) -> ArchiveResult<String> {
        let mut parts: Vec<&AttributeValue> = Vec::with_capacity(self.key_names.len());
        for name in &self.key_names {
            let value = item.get(name).ok_or_else(|| {
                ArchiveError::remote(
                    operation,
                    self.name(),
                    ErrorCode::ValidationException,
                    format!("missing key attribute {name}"),
                )
            })?;
            parts.push(value);
        }
        Ok(serde_json::to_string(&parts)?)
    }

    /// Items after `start`, filtered by `keep`, at most `limit` of them, plus
    /// the continuation key when more matching items follow.
    fn page(
        &self,
        operation: TableOperation,
        start: &Key,
        limit: Option<i32>,
        keep: impl Fn(&Item) -> bool,
    ) -> ArchiveResult<(Vec<Item>, Key)> {
        let lower = if start.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(self.storage_key(operation, start)?)
        };
        let limit = limit.map_or(usize::MAX, |l| usize::try_from(l.max(1)).unwrap_or(usize::MAX));

        let mut matching = self
            .items
            .range((lower, Bound::Unbounded))
            .map(|(_, item)| item)
            .filter(|item| keep(item));
        let items: Vec<Item> = matching.by_ref().take(limit).cloned().collect();
        let last_key = match (items.last(), matching.next()) {
            (Some(last), Some(_)) => self.key_of(last),
            _ => Key::new(),
        };
        Ok((items, last_key))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: HashMap<String, MemoryTable>,
    requests: Vec<RecordedRequest>,
    puts: u64,
    fail_put_at: Option<u64>,
    reads: u64,
    fail_read_at: Option<u64>,
    blank_describe: HashSet<String>,
}

impl MemoryState {
    /// Count a `Scan` or `Query` and fail it when it is the injected one.
    fn read(&mut self, operation: TableOperation, name: &str) -> ArchiveResult<()> {
        self.reads += 1;
        if self.fail_read_at == Some(self.reads) {
            return Err(ArchiveError::remote(
                operation,
                name,
                ErrorCode::ProvisionedThroughputExceededException,
                "injected throttling",
            ));
        }
        Ok(())
    }

    fn table(&self, operation: TableOperation, name: &str) -> ArchiveResult<&MemoryTable> {
        self.tables.get(name).ok_or_else(|| not_found(operation, name))
    }
}

fn not_found(operation: TableOperation, name: &str) -> ArchiveError {
    ArchiveError::remote(
        operation,
        name,
        ErrorCode::ResourceNotFoundException,
        format!("Requested resource not found: Table: {name} not found"),
    )
}

fn count(items: &[Item]) -> i32 {
    i32::try_from(items.len()).unwrap_or(i32::MAX)
}

/// In-memory DynamoDB stand-in.
#[derive(Debug, Default)]
pub struct MemoryTableClient {
    state: Mutex<MemoryState>,
}

impl MemoryTableClient {
    /// An empty client with no tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table keyed by a single string partition key.
    pub fn add_table(&self, name: &str, hash_key: &str, read_capacity: i64, write_capacity: i64) {
        let description = TableDescription {
            table_name: Some(name.to_owned()),
            table_status: Some(TableStatus::Active),
            key_schema: vec![KeySchemaElement {
                attribute_name: hash_key.to_owned(),
                key_type: KeyType::Hash,
            }],
            attribute_definitions: vec![AttributeDefinition {
                attribute_name: hash_key.to_owned(),
                attribute_type: ScalarAttributeType::S,
            }],
            provisioned_throughput: Some(ProvisionedThroughputDescription {
                read_capacity_units: read_capacity,
                write_capacity_units: write_capacity,
                number_of_decreases_today: Some(0),
            }),
            ..Default::default()
        };
        self.add_table_description(description);
    }

    /// Add a table from a full description, replacing any table of the same
    /// name.
    pub fn add_table_description(&self, description: TableDescription) {
        let table = MemoryTable::new(description);
        let name = table.name().to_owned();
        self.state.lock().tables.insert(name, table);
    }

    /// Store an item directly, bypassing request recording.
    pub fn insert(&self, table_name: &str, item: Item) -> ArchiveResult<()> {
        let mut state = self.state.lock();
        let table = state
            .tables
            .get_mut(table_name)
            .ok_or_else(|| not_found(TableOperation::PutItem, table_name))?;
        let key = table.storage_key(TableOperation::PutItem, &item)?;
        table.items.insert(key, item);
        Ok(())
    }

    /// Make the n-th `PutItem` (counting from one) fail.
    pub fn fail_put_at(&self, n: u64) {
        self.state.lock().fail_put_at = Some(n);
    }

    /// Make the n-th `Scan` or `Query` (counting from one) fail as throttled.
    pub fn fail_read_at(&self, n: u64) {
        self.state.lock().fail_read_at = Some(n);
    }

    /// Answer `DescribeTable` for `table_name` without a description.
    pub fn blank_describe(&self, table_name: &str) {
        self.state.lock().blank_describe.insert(table_name.to_owned());
    }

    /// Items of a table in key order; empty for an unknown table.
    #[must_use]
    pub fn items(&self, table_name: &str) -> Vec<Item> {
        self.state
            .lock()
            .tables
            .get(table_name)
            .map(|t| t.items.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Current description of a table.
    #[must_use]
    pub fn table(&self, table_name: &str) -> Option<TableDescription> {
        self.state
            .lock()
            .tables
            .get(table_name)
            .map(|t| t.description.clone())
    }

    /// All requests received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    /// Number of `Scan` requests received.
    #[must_use]
    pub fn scan_count(&self) -> usize {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|r| matches!(r, RecordedRequest::Scan(_)))
            .count()
    }

    /// Number of `PutItem` requests received, including failed ones.
    #[must_use]
    pub fn put_count(&self) -> u64 {
        self.state.lock().puts
    }
}

#[async_trait]
impl TableClient for MemoryTableClient {
    async fn describe_table(
        &self,
        input: DescribeTableInput,
    ) -> ArchiveResult<DescribeTableOutput> {
        let mut state = self.state.lock();
        state.requests.push(RecordedRequest::DescribeTable(input.clone()));
        if state.blank_describe.contains(&input.table_name) {
            return Ok(DescribeTableOutput { table: None });
        }
        let table = state.table(TableOperation::DescribeTable, &input.table_name)?;
        let mut description = table.description.clone();
        description.item_count = Some(i64::try_from(table.items.len()).unwrap_or(i64::MAX));
        Ok(DescribeTableOutput {
            table: Some(description),
        })
    }

    async fn create_table(&self, input: CreateTableInput) -> ArchiveResult<CreateTableOutput> {
        let mut state = self.state.lock();
        state.requests.push(RecordedRequest::CreateTable(input.clone()));
        let name = input.table_name;
        if state.tables.contains_key(&name) {
            return Err(ArchiveError::remote(
                TableOperation::CreateTable,
                &name,
                ErrorCode::ResourceInUseException,
                format!("Table already exists: {name}"),
            ));
        }
        if !input.key_schema.iter().any(|k| k.key_type == KeyType::Hash) {
            return Err(ArchiveError::remote(
                TableOperation::CreateTable,
                &name,
                ErrorCode::ValidationException,
                "key schema has no HASH key",
            ));
        }
        let description = TableDescription {
            table_name: Some(name.clone()),
            table_status: Some(TableStatus::Active),
            key_schema: input.key_schema,
            attribute_definitions: input.attribute_definitions,
            provisioned_throughput: input.provisioned_throughput.map(|pt| {
                ProvisionedThroughputDescription {
                    read_capacity_units: pt.read_capacity_units,
                    write_capacity_units: pt.write_capacity_units,
                    number_of_decreases_today: Some(0),
                }
            }),
            ..Default::default()
        };
        debug!(table = %name, "created in-memory table");
        state
            .tables
            .insert(name, MemoryTable::new(description.clone()));
        Ok(CreateTableOutput {
            table_description: Some(description),
        })
    }

    async fn put_item(&self, input: PutItemInput) -> ArchiveResult<PutItemOutput> {
        let mut state = self.state.lock();
        state.requests.push(RecordedRequest::PutItem(input.clone()));
        state.puts += 1;
        if state.fail_put_at == Some(state.puts) {
            return Err(ArchiveError::remote(
                TableOperation::PutItem,
                &input.table_name,
                ErrorCode::InternalServerError,
                "injected failure",
            ));
        }
        let table = state
            .tables
            .get_mut(&input.table_name)
            .ok_or_else(|| not_found(TableOperation::PutItem, &input.table_name))?;
        let key = table.storage_key(TableOperation::PutItem, &input.item)?;
        table.items.insert(key, input.item);
        Ok(PutItemOutput::default())
    }

    async fn scan(&self, input: ScanInput) -> ArchiveResult<ScanOutput> {
        let mut state = self.state.lock();
        state.requests.push(RecordedRequest::Scan(input.clone()));
        state.read(TableOperation::Scan, &input.table_name)?;
        let table = state.table(TableOperation::Scan, &input.table_name)?;
        if let Some(index) = &input.index_name {
            return Err(ArchiveError::remote(
                TableOperation::Scan,
                &input.table_name,
                ErrorCode::ValidationException,
                format!("index {index} is not supported in memory"),
            ));
        }
        let (items, last_evaluated_key) = table.page(
            TableOperation::Scan,
            &input.exclusive_start_key,
            input.limit,
            |_| true,
        )?;
        Ok(ScanOutput {
            count: count(&items),
            scanned_count: count(&items),
            items,
            last_evaluated_key,
            consumed_capacity: None,
        })
    }

    async fn query(&self, input: QueryInput) -> ArchiveResult<QueryOutput> {
        let mut state = self.state.lock();
        state.requests.push(RecordedRequest::Query(input.clone()));
        state.read(TableOperation::Query, &input.table_name)?;
        let table = state.table(TableOperation::Query, &input.table_name)?;

        let mut wanted: Vec<(&String, &AttributeValue)> = Vec::new();
        for (name, condition) in &input.key_conditions {
            match (&condition.comparison_operator, condition.attribute_value_list.as_slice()) {
                (ComparisonOperator::Eq, [value]) => wanted.push((name, value)),
                (op, _) => {
                    return Err(ArchiveError::remote(
                        TableOperation::Query,
                        &input.table_name,
                        ErrorCode::ValidationException,
                        format!("unsupported key condition {op} on {name}"),
                    ));
                }
            }
        }
        let hash_key = table.description.hash_key_name();
        if !wanted.iter().any(|(name, _)| Some(name.as_str()) == hash_key) {
            return Err(ArchiveError::remote(
                TableOperation::Query,
                &input.table_name,
                ErrorCode::ValidationException,
                "query must specify the hash key with EQ",
            ));
        }

        let (items, last_evaluated_key) = table.page(
            TableOperation::Query,
            &input.exclusive_start_key,
            input.limit,
            |item| wanted.iter().all(|(name, value)| item.get(*name) == Some(*value)),
        )?;
        Ok(QueryOutput {
            count: count(&items),
            scanned_count: count(&items),
            items,
            last_evaluated_key,
            consumed_capacity: None,
        })
    }
}
