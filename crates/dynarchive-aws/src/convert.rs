//! Conversions between SDK types and the wire model.
//!
//! Items travel through these functions on every read and write, so values
//! are moved rather than cloned wherever the SDK hands out owned data.

use std::collections::HashMap;

use aws_sdk_dynamodb::error::BuildError;
use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types as sdk;
use dynarchive_model::types::{
    AttributeDefinition, BillingMode, BillingModeSummary, Condition, ConsumedCapacity,
    KeySchemaElement, KeyType, ProvisionedThroughput, ProvisionedThroughputDescription,
    ScalarAttributeType, TableDescription, TableStatus,
};
use dynarchive_model::{AttributeValue, Item};

/// A value the SDK returned that the wire model cannot represent.
#[derive(Debug, thiserror::Error)]
#[error("unsupported attribute value: {0}")]
pub struct ConversionError(String);

// ---------------------------------------------------------------------------
// Attribute values
// ---------------------------------------------------------------------------

pub(crate) fn value_to_sdk(value: AttributeValue) -> sdk::AttributeValue {
    match value {
        AttributeValue::S(s) => sdk::AttributeValue::S(s),
        AttributeValue::N(n) => sdk::AttributeValue::N(n),
        AttributeValue::B(b) => sdk::AttributeValue::B(Blob::new(b.to_vec())),
        AttributeValue::Ss(v) => sdk::AttributeValue::Ss(v),
        AttributeValue::Ns(v) => sdk::AttributeValue::Ns(v),
        AttributeValue::Bs(v) => {
            sdk::AttributeValue::Bs(v.into_iter().map(|b| Blob::new(b.to_vec())).collect())
        }
        AttributeValue::Bool(b) => sdk::AttributeValue::Bool(b),
        AttributeValue::Null(b) => sdk::AttributeValue::Null(b),
        AttributeValue::L(list) => sdk::AttributeValue::L(list.into_iter().map(value_to_sdk).collect()),
        AttributeValue::M(map) => sdk::AttributeValue::M(item_to_sdk(map)),
    }
}

pub(crate) fn value_from_sdk(value: sdk::AttributeValue) -> Result<AttributeValue, ConversionError> {
    let converted = match value {
        sdk::AttributeValue::S(s) => AttributeValue::S(s),
        sdk::AttributeValue::N(n) => AttributeValue::N(n),
        sdk::AttributeValue::B(b) => AttributeValue::B(bytes::Bytes::from(b.into_inner())),
        sdk::AttributeValue::Ss(v) => AttributeValue::Ss(v),
        sdk::AttributeValue::Ns(v) => AttributeValue::Ns(v),
        sdk::AttributeValue::Bs(v) => AttributeValue::Bs(
            v.into_iter()
                .map(|b| bytes::Bytes::from(b.into_inner()))
                .collect(),
        ),
        sdk::AttributeValue::Bool(b) => AttributeValue::Bool(b),
        sdk::AttributeValue::Null(b) => AttributeValue::Null(b),
        sdk::AttributeValue::L(list) => AttributeValue::L(
            list.into_iter()
                .map(value_from_sdk)
                .collect::<Result<_, _>>()?,
        ),
        sdk::AttributeValue::M(map) => AttributeValue::M(item_from_sdk(map)?),
        other => return Err(ConversionError(format!("{other:?}"))),
    };
    Ok(converted)
}

pub(crate) fn item_to_sdk(item: Item) -> HashMap<String, sdk::AttributeValue> {
    item.into_iter()
        .map(|(name, value)| (name, value_to_sdk(value)))
        .collect()
}

pub(crate) fn item_from_sdk(
    item: HashMap<String, sdk::AttributeValue>,
) -> Result<Item, ConversionError> {
    item.into_iter()
        .map(|(name, value)| value_from_sdk(value).map(|v| (name, v)))
        .collect()
}

/// Empty or absent keys map to `None` so the SDK omits them.
pub(crate) fn key_to_sdk(key: Item) -> Option<HashMap<String, sdk::AttributeValue>> {
    if key.is_empty() {
        None
    } else {
        Some(item_to_sdk(key))
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub(crate) fn key_schema_to_sdk(
    schema: Vec<KeySchemaElement>,
) -> Result<Vec<sdk::KeySchemaElement>, BuildError> {
    schema
        .into_iter()
        .map(|k| {
            sdk::KeySchemaElement::builder()
                .attribute_name(k.attribute_name)
                .key_type(sdk::KeyType::from(k.key_type.as_str()))
                .build()
        })
        .collect()
}

pub(crate) fn attribute_definitions_to_sdk(
    definitions: Vec<AttributeDefinition>,
) -> Result<Vec<sdk::AttributeDefinition>, BuildError> {
    definitions
        .into_iter()
        .map(|d| {
            sdk::AttributeDefinition::builder()
                .attribute_name(d.attribute_name)
                .attribute_type(sdk::ScalarAttributeType::from(d.attribute_type.as_str()))
                .build()
        })
        .collect()
}

pub(crate) fn throughput_to_sdk(
    throughput: ProvisionedThroughput,
) -> Result<sdk::ProvisionedThroughput, BuildError> {
    sdk::ProvisionedThroughput::builder()
        .read_capacity_units(throughput.read_capacity_units)
        .write_capacity_units(throughput.write_capacity_units)
        .build()
}

pub(crate) fn conditions_to_sdk(
    conditions: HashMap<String, Condition>,
) -> Result<HashMap<String, sdk::Condition>, BuildError> {
    conditions
        .into_iter()
        .map(|(name, condition)| {
            let values = condition
                .attribute_value_list
                .into_iter()
                .map(value_to_sdk)
                .collect::<Vec<_>>();
            sdk::Condition::builder()
                .comparison_operator(sdk::ComparisonOperator::from(
                    condition.comparison_operator.as_str(),
                ))
                .set_attribute_value_list(if values.is_empty() { None } else { Some(values) })
                .build()
                .map(|c| (name, c))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

pub(crate) fn table_description_from_sdk(table: &sdk::TableDescription) -> TableDescription {
    TableDescription {
        table_name: table.table_name().map(str::to_owned),
        table_status: table
            .table_status()
            .map(|s| TableStatus::from_name(s.as_str())),
        key_schema: table
            .key_schema()
            .iter()
            .filter_map(|k| {
                KeyType::from_name(k.key_type().as_str()).map(|key_type| KeySchemaElement {
                    attribute_name: k.attribute_name().to_owned(),
                    key_type,
                })
            })
            .collect(),
        attribute_definitions: table
            .attribute_definitions()
            .iter()
            .map(|d| AttributeDefinition {
                attribute_name: d.attribute_name().to_owned(),
                attribute_type: ScalarAttributeType::from_name(d.attribute_type().as_str()),
            })
            .collect(),
        creation_date_time: table.creation_date_time().map(|t| t.as_secs_f64()),
        item_count: table.item_count(),
        table_size_bytes: table.table_size_bytes(),
        table_arn: table.table_arn().map(str::to_owned),
        billing_mode_summary: table.billing_mode_summary().map(|b| BillingModeSummary {
            billing_mode: b.billing_mode().map(|m| BillingMode::from_name(m.as_str())),
        }),
        provisioned_throughput: table.provisioned_throughput().map(|pt| {
            ProvisionedThroughputDescription {
                read_capacity_units: pt.read_capacity_units().unwrap_or_default(),
                write_capacity_units: pt.write_capacity_units().unwrap_or_default(),
                number_of_decreases_today: pt.number_of_decreases_today(),
            }
        }),
    }
}

pub(crate) fn consumed_capacity_from_sdk(capacity: &sdk::ConsumedCapacity) -> ConsumedCapacity {
    ConsumedCapacity {
        table_name: capacity.table_name().map(str::to_owned),
        capacity_units: capacity.capacity_units(),
    }
}

#[cfg(test)]
mod tests {
    use dynarchive_model::types::ComparisonOperator;

    use super::*;

    fn nested_item() -> Item {
        HashMap::from([
            ("id".to_owned(), AttributeValue::S("a".to_owned())),
            ("n".to_owned(), AttributeValue::N("1.5".to_owned())),
            (
                "blob".to_owned(),
                AttributeValue::B(bytes::Bytes::from_static(b"\x00\x01")),
            ),
            (
                "nested".to_owned(),
                AttributeValue::M(HashMap::from([(
                    "tags".to_owned(),
                    AttributeValue::L(vec![
                        AttributeValue::Ss(vec!["x".to_owned()]),
                        AttributeValue::Null(true),
                    ]),
                )])),
            ),
        ])
    }

    #[test]
    fn test_should_convert_item_to_sdk_and_back() {
        let sdk_item = item_to_sdk(nested_item());
        assert_eq!(sdk_item["n"], sdk::AttributeValue::N("1.5".to_owned()));
        assert_eq!(
            sdk_item["blob"],
            sdk::AttributeValue::B(Blob::new(vec![0_u8, 1]))
        );
        assert_eq!(item_from_sdk(sdk_item).unwrap(), nested_item());
    }

    #[test]
    fn test_should_omit_empty_key() {
        assert!(key_to_sdk(Item::new()).is_none());
        assert!(key_to_sdk(nested_item()).is_some());
    }

    #[test]
    fn test_should_build_conditions() {
        let conditions = HashMap::from([(
            "pk".to_owned(),
            Condition {
                comparison_operator: ComparisonOperator::BeginsWith,
                attribute_value_list: vec![AttributeValue::S("ab".to_owned())],
            },
        )]);
        let sdk_conditions = conditions_to_sdk(conditions).unwrap();
        let pk = &sdk_conditions["pk"];
        assert_eq!(pk.comparison_operator(), &sdk::ComparisonOperator::BeginsWith);
        assert_eq!(pk.attribute_value_list(), &[sdk::AttributeValue::S("ab".to_owned())]);
    }

    #[test]
    fn test_should_read_table_description() {
        let table = sdk::TableDescription::builder()
            .table_name("Orders")
            .table_status(sdk::TableStatus::Active)
            .key_schema(
                sdk::KeySchemaElement::builder()
                    .attribute_name("id")
                    .key_type(sdk::KeyType::Hash)
                    .build()
                    .unwrap(),
            )
            .attribute_definitions(
                sdk::AttributeDefinition::builder()
                    .attribute_name("id")
                    .attribute_type(sdk::ScalarAttributeType::S)
                    .build()
                    .unwrap(),
            )
            .provisioned_throughput(
                sdk::ProvisionedThroughputDescription::builder()
                    .read_capacity_units(7)
                    .write_capacity_units(3)
                    .build(),
            )
            .build();
        let desc = table_description_from_sdk(&table);
        assert_eq!(desc.table_name.as_deref(), Some("Orders"));
        assert_eq!(desc.table_status, Some(TableStatus::Active));
        assert_eq!(desc.hash_key_name(), Some("id"));
        assert_eq!(desc.attribute_definitions[0].attribute_type, ScalarAttributeType::S);
        assert_eq!((desc.read_capacity_units(), desc.write_capacity_units()), (7, 3));
    }

    #[test]
    fn test_should_build_key_schema_and_throughput() {
        let schema = key_schema_to_sdk(vec![KeySchemaElement {
            attribute_name: "id".to_owned(),
            key_type: KeyType::Range,
        }])
        .unwrap();
        assert_eq!(schema[0].key_type(), &sdk::KeyType::Range);
        let pt = throughput_to_sdk(ProvisionedThroughput {
            read_capacity_units: 1,
            write_capacity_units: 2,
        })
        .unwrap();
        assert_eq!(pt.write_capacity_units(), 2);
    }
}
