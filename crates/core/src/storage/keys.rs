//! Table key schemas.
//!
//! Pure types describing a table's partition key and optional sort key, and
//! the conversion to the store's table definition. No I/O.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::InputError;

/// Scalar types a key attribute may be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    String,
    Number,
    Boolean,
}

impl ScalarType {
    /// The store's attribute type tag for this scalar type.
    pub fn attribute_type(self) -> &'static str {
        match self {
            ScalarType::String => "S",
            ScalarType::Number => "N",
            ScalarType::Boolean => "B",
        }
    }

    /// Returns true if `value` is a plain value of this type.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            ScalarType::String => value.is_string(),
            ScalarType::Number => value.is_number(),
            ScalarType::Boolean => value.is_boolean(),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::String => "string",
            ScalarType::Number => "number",
            ScalarType::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

impl FromStr for ScalarType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ScalarType::String),
            "number" => Ok(ScalarType::Number),
            "boolean" => Ok(ScalarType::Boolean),
            _ => Err(InputError::new("type")),
        }
    }
}

/// A named, typed key attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub scalar_type: ScalarType,
}

impl KeyAttribute {
    pub fn new(name: impl Into<String>, scalar_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            scalar_type,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ScalarType::String)
    }
}

/// A table's key schema: a partition key and an optional sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySchema {
    pub partition: KeyAttribute,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<KeyAttribute>,
}

impl KeySchema {
    pub fn new(partition: KeyAttribute) -> Self {
        Self {
            partition,
            sort: None,
        }
    }

    pub fn with_sort(mut self, sort: KeyAttribute) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Checks that every declared key attribute has a name.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.partition.name.is_empty() {
            return Err(InputError::nested("name", "partition"));
        }
        if let Some(sort) = &self.sort {
            if sort.name.is_empty() {
                return Err(InputError::nested("name", "sort"));
            }
        }
        Ok(())
    }

    /// Parses a loose `{partition: {name, type}, sort?: {name, type}}` descriptor.
    pub fn from_descriptor(descriptor: &Value) -> Result<Self, InputError> {
        let descriptor = descriptor
            .as_object()
            .ok_or_else(|| InputError::new("key"))?;
        let partition = descriptor
            .get("partition")
            .filter(|v| !v.is_null())
            .ok_or_else(|| InputError::nested("partition", "key"))?;
        let partition = parse_attribute(partition, "partition")?;
        let sort = match descriptor.get("sort") {
            None | Some(Value::Null) => None,
            Some(sort) => Some(parse_attribute(sort, "sort")?),
        };
        Ok(Self { partition, sort })
    }

    /// Builds the store's table definition for this key schema.
    pub fn table_definition(&self) -> TableDefinition {
        let mut attribute_definitions = vec![AttributeDefinition {
            name: self.partition.name.clone(),
            attribute_type: self.partition.scalar_type.attribute_type(),
        }];
        let mut key_schema = vec![KeySchemaElement {
            name: self.partition.name.clone(),
            key_type: KeyType::Hash,
        }];

        if let Some(sort) = &self.sort {
            attribute_definitions.push(AttributeDefinition {
                name: sort.name.clone(),
                attribute_type: sort.scalar_type.attribute_type(),
            });
            key_schema.push(KeySchemaElement {
                name: sort.name.clone(),
                key_type: KeyType::Range,
            });
        }

        TableDefinition {
            attribute_definitions,
            key_schema,
            billing_mode: BillingMode::PayPerRequest,
        }
    }
}

fn parse_attribute(value: &Value, parent: &str) -> Result<KeyAttribute, InputError> {
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| InputError::nested("name", parent))?;
    let scalar_type = value
        .get("type")
        .and_then(Value::as_str)
        .and_then(|t| t.parse::<ScalarType>().ok())
        .ok_or_else(|| InputError::nested("type", parent))?;
    Ok(KeyAttribute::new(name, scalar_type))
}

/// Declared type of one key attribute in a table definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDefinition {
    pub name: String,
    pub attribute_type: &'static str,
}

/// Role of a key attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    Hash,
    Range,
}

/// One element of a table's key schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchemaElement {
    pub name: String,
    pub key_type: KeyType,
}

/// Billing mode for the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingMode {
    PayPerRequest,
}

/// Everything the store needs to create a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub key_schema: Vec<KeySchemaElement>,
    pub billing_mode: BillingMode,
}

impl TableDefinition {
    /// Name of the partition (HASH) key attribute.
    pub fn partition_key(&self) -> Option<&AttributeDefinition> {
        self.attribute_for(KeyType::Hash)
    }

    /// Name of the sort (RANGE) key attribute, if any.
    pub fn sort_key(&self) -> Option<&AttributeDefinition> {
        self.attribute_for(KeyType::Range)
    }

    fn attribute_for(&self, key_type: KeyType) -> Option<&AttributeDefinition> {
        let element = self.key_schema.iter().find(|e| e.key_type == key_type)?;
        self.attribute_definitions
            .iter()
            .find(|a| a.name == element.name)
    }
}
