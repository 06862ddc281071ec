//! Response shapes for the operations the table tools issue.

use serde::{Deserialize, Serialize};

use crate::types::{ConsumedCapacity, Item, Key, TableDescription};

/// Output for the `CreateTable` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateTableOutput {
    /// The properties of the newly created table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_description: Option<TableDescription>,
}

/// Output for the `DescribeTable` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeTableOutput {
    /// The properties of the table. `None` is treated as missing data.
    #[serde(rename = "Table", skip_serializing_if = "Option::is_none")]
    pub table: Option<TableDescription>,
}

/// Output for the `PutItem` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutItemOutput {
    /// The capacity units consumed by the write.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_capacity: Option<ConsumedCapacity>,
}

/// Output for the `Query` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryOutput {
    /// The items matching the key conditions, in key order.
    #[serde(default)]
    pub items: Vec<Item>,

    /// The number of items in the response.
    pub count: i32,

    /// The number of items evaluated.
    pub scanned_count: i32,

    /// The primary key of the item where the query stopped. Empty when the
    /// last page has been read.
    #[serde(default, skip_serializing_if = "Key::is_empty")]
    pub last_evaluated_key: Key,

    /// The capacity units consumed by the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_capacity: Option<ConsumedCapacity>,
}

/// Output for the `Scan` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScanOutput {
    /// The items returned by the scan.
    #[serde(default)]
    pub items: Vec<Item>,

    /// The number of items in the response.
    pub count: i32,

    /// The number of items evaluated.
    pub scanned_count: i32,

    /// The primary key of the item where the scan operation stopped. Use this
    /// value as `ExclusiveStartKey` in a subsequent scan to continue.
    #[serde(default, skip_serializing_if = "Key::is_empty")]
    pub last_evaluated_key: Key,

    /// The capacity units consumed by the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_capacity: Option<ConsumedCapacity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_treat_missing_last_key_as_empty() {
        let out: ScanOutput =
            serde_json::from_str(r#"{"Items":[{"id":{"S":"1"}}],"Count":1,"ScannedCount":1}"#)
                .expect("deserialize ScanOutput");
        assert_eq!(out.items.len(), 1);
        assert!(out.last_evaluated_key.is_empty());
    }

    #[test]
    fn test_should_read_describe_output_table_field() {
        let out: DescribeTableOutput = serde_json::from_str(
            r#"{"Table":{"TableName":"T","ProvisionedThroughput":{"ReadCapacityUnits":5,"WriteCapacityUnits":3}}}"#,
        )
        .expect("deserialize DescribeTableOutput");
        let table = out.table.expect("table present");
        assert_eq!(table.read_capacity_units(), 5);
        assert_eq!(table.write_capacity_units(), 3);
    }
}
