//! DynamoDB attribute conversion functions.
//!
//! Outbound items are plain JSON turned into `AttributeValue` maps. Query
//! results go the other way into the tagged JSON form the storage client
//! decodes. Pure functions, testable without DynamoDB access.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType,
    ScalarAttributeType, TableStatus as SdkTableStatus,
};
use finsync_core::storage::{
    self, DriverError, Item, TableDefinition, TableStatus, TAG_BINARY, TAG_BOOLEAN, TAG_LIST,
    TAG_MAP, TAG_NULL, TAG_NUMBER, TAG_STRING,
};
use serde_json::{Map, Value};

use super::error::build_error;

// ============================================================================
// Outbound
// ============================================================================

/// Convert a plain JSON value to an attribute value.
pub fn value_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(values) => AttributeValue::L(values.iter().map(value_to_attribute).collect()),
        Value::Object(fields) => AttributeValue::M(item_to_attributes(fields)),
    }
}

/// Convert a plain item to a DynamoDB item.
pub fn item_to_attributes(item: &Item) -> HashMap<String, AttributeValue> {
    item.iter()
        .map(|(key, value)| (key.clone(), value_to_attribute(value)))
        .collect()
}

// ============================================================================
// Inbound
// ============================================================================

/// Convert an attribute value to its tagged JSON form.
///
/// Sets become tagged lists. Binary values are carried as lossy UTF-8 text.
pub fn attribute_to_tagged(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => tagged(TAG_STRING, Value::String(s.clone())),
        AttributeValue::N(n) => tagged(TAG_NUMBER, Value::String(n.clone())),
        AttributeValue::Bool(b) => tagged(TAG_BOOLEAN, Value::Bool(*b)),
        AttributeValue::Null(_) => tagged(TAG_NULL, Value::Bool(true)),
        AttributeValue::B(blob) => tagged(TAG_BINARY, blob_text(blob.as_ref())),
        AttributeValue::M(fields) => tagged(TAG_MAP, Value::Object(attributes_to_tagged(fields))),
        AttributeValue::L(values) => tagged(
            TAG_LIST,
            Value::Array(values.iter().map(attribute_to_tagged).collect()),
        ),
        AttributeValue::Ss(values) => tagged(
            TAG_LIST,
            values
                .iter()
                .map(|s| tagged(TAG_STRING, Value::String(s.clone())))
                .collect(),
        ),
        AttributeValue::Ns(values) => tagged(
            TAG_LIST,
            values
                .iter()
                .map(|n| tagged(TAG_NUMBER, Value::String(n.clone())))
                .collect(),
        ),
        AttributeValue::Bs(values) => tagged(
            TAG_LIST,
            values
                .iter()
                .map(|blob| tagged(TAG_BINARY, blob_text(blob.as_ref())))
                .collect(),
        ),
        _ => tagged(TAG_NULL, Value::Bool(true)),
    }
}

/// Convert a DynamoDB item to a tagged item.
pub fn attributes_to_tagged(item: &HashMap<String, AttributeValue>) -> Item {
    item.iter()
        .map(|(key, value)| (key.clone(), attribute_to_tagged(value)))
        .collect()
}

fn tagged(tag: &str, inner: Value) -> Value {
    let mut wrapper = Map::with_capacity(1);
    wrapper.insert(tag.to_string(), inner);
    Value::Object(wrapper)
}

fn blob_text(bytes: &[u8]) -> Value {
    Value::String(String::from_utf8_lossy(bytes).into_owned())
}

// ============================================================================
// Table definitions
// ============================================================================

fn to_scalar_type(attribute_type: &str) -> ScalarAttributeType {
    ScalarAttributeType::from(attribute_type)
}

fn to_key_type(key_type: storage::KeyType) -> KeyType {
    match key_type {
        storage::KeyType::Hash => KeyType::Hash,
        storage::KeyType::Range => KeyType::Range,
    }
}

fn to_billing_mode(billing_mode: storage::BillingMode) -> BillingMode {
    match billing_mode {
        storage::BillingMode::PayPerRequest => BillingMode::PayPerRequest,
    }
}

/// SDK request parts for a table definition.
pub struct CreateTableParts {
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub key_schema: Vec<KeySchemaElement>,
    pub billing_mode: BillingMode,
}

/// Convert a table definition into SDK request parts.
pub fn table_definition_parts(definition: &TableDefinition) -> Result<CreateTableParts, DriverError> {
    let attribute_definitions = definition
        .attribute_definitions
        .iter()
        .map(|attribute| {
            AttributeDefinition::builder()
                .attribute_name(&attribute.name)
                .attribute_type(to_scalar_type(attribute.attribute_type))
                .build()
                .map_err(build_error)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let key_schema = definition
        .key_schema
        .iter()
        .map(|element| {
            KeySchemaElement::builder()
                .attribute_name(&element.name)
                .key_type(to_key_type(element.key_type))
                .build()
                .map_err(build_error)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CreateTableParts {
        attribute_definitions,
        key_schema,
        billing_mode: to_billing_mode(definition.billing_mode),
    })
}

/// Convert the SDK's table status.
pub fn to_table_status(status: &SdkTableStatus) -> TableStatus {
    match status {
        SdkTableStatus::Active => TableStatus::Active,
        SdkTableStatus::Creating => TableStatus::Creating,
        SdkTableStatus::Deleting => TableStatus::Deleting,
        _ => TableStatus::Updating,
    }
}
