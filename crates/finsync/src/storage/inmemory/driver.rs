//! In-memory store driver.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use finsync_core::storage::{
    encode_item, AttributeDefinition, DriverError, Item, QueryRequest, StoreDriver,
    TableDefinition, TableStatus, RESOURCE_IN_USE, RESOURCE_NOT_FOUND, UNRECOGNIZED_CLIENT,
    VALIDATION,
};

#[derive(Debug, Clone)]
struct MemoryTable {
    definition: TableDefinition,
    items: Vec<Item>,
    /// Status checks left before the table reports active.
    pending_polls: u32,
}

impl MemoryTable {
    fn is_active(&self) -> bool {
        self.pending_polls == 0
    }

    fn same_key(&self, a: &Item, b: &Item) -> bool {
        self.definition
            .key_schema
            .iter()
            .all(|element| a.get(&element.name) == b.get(&element.name))
    }

    fn upsert(&mut self, item: Item) {
        let existing = self.items.iter().position(|stored| self.same_key(stored, &item));
        match existing {
            Some(index) => self.items[index] = item,
            None => self.items.push(item),
        }
    }
}

/// In-memory store driver for testing and local runs.
///
/// Mirrors the error names and messages of the hosted store so the storage
/// client classifies them the same way. Data is lost when the driver is
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDriver {
    tables: Arc<RwLock<HashMap<String, MemoryTable>>>,
    activation_polls: u32,
    reject_credentials: bool,
}

impl InMemoryDriver {
    /// Creates a driver with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    fn check_credentials(&self) -> Result<(), DriverError> {
        if self.reject_credentials {
            return Err(DriverError::new(
                UNRECOGNIZED_CLIENT,
                "The security token included in the request is invalid.",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
impl InMemoryDriver {
    /// New tables report `CREATING` for the first `polls` status checks.
    pub fn with_activation_polls(mut self, polls: u32) -> Self {
        self.activation_polls = polls;
        self
    }

    /// Every request fails as if the credentials were rejected.
    pub fn rejecting_credentials(mut self) -> Self {
        self.reject_credentials = true;
        self
    }

    /// Names of the tables created so far.
    pub async fn table_names(&self) -> Vec<String> {
        let tables = self.tables.read().await;
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        names
    }
}

fn resource_not_found() -> DriverError {
    DriverError::new(RESOURCE_NOT_FOUND, "Requested resource not found")
}

fn active_table<'a>(
    tables: &'a mut HashMap<String, MemoryTable>,
    table: &str,
) -> Result<&'a mut MemoryTable, DriverError> {
    match tables.get_mut(table) {
        Some(stored) if stored.is_active() => Ok(stored),
        _ => Err(resource_not_found()),
    }
}

fn attribute_type_of(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "S",
        Value::Number(_) => "N",
        Value::Bool(_) => "BOOL",
        Value::Null => "NULL",
        Value::Array(_) => "L",
        Value::Object(_) => "M",
    }
}

fn validate_key(definition: &TableDefinition, item: &Item) -> Result<(), DriverError> {
    for element in &definition.key_schema {
        let Some(value) = item.get(&element.name) else {
            return Err(DriverError::new(
                VALIDATION,
                format!(
                    "One or more parameter values were invalid: Missing the key {} in the item",
                    element.name
                ),
            ));
        };

        let expected = definition
            .attribute_definitions
            .iter()
            .find(|a| a.name == element.name)
            .map(|a| a.attribute_type)
            .unwrap_or("S");
        let actual = attribute_type_of(value);
        if actual != expected {
            return Err(DriverError::new(
                VALIDATION,
                format!(
                    "One or more parameter values were invalid: Type mismatch for key {} expected: {expected} actual: {actual}",
                    element.name
                ),
            ));
        }
    }
    Ok(())
}

fn compare_sort_values(a: Option<&Value>, b: Option<&Value>, sort: &AttributeDefinition) -> Ordering {
    if sort.attribute_type == "N" {
        let a = a.and_then(Value::as_f64);
        let b = b.and_then(Value::as_f64);
        return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    }
    let a = a.and_then(Value::as_str);
    let b = b.and_then(Value::as_str);
    a.cmp(&b)
}

#[async_trait]
impl StoreDriver for InMemoryDriver {
    async fn put_item(&self, table: &str, item: &Item) -> Result<(), DriverError> {
        self.check_credentials()?;
        let mut tables = self.tables.write().await;
        let stored = active_table(&mut tables, table)?;

        validate_key(&stored.definition, item)?;
        stored.upsert(item.clone());
        Ok(())
    }

    async fn batch_put_items(&self, table: &str, items: &[Item]) -> Result<(), DriverError> {
        self.check_credentials()?;
        let mut tables = self.tables.write().await;
        let stored = active_table(&mut tables, table)?;

        for item in items {
            validate_key(&stored.definition, item)?;
        }
        for (i, item) in items.iter().enumerate() {
            if items[..i].iter().any(|earlier| stored.same_key(earlier, item)) {
                return Err(DriverError::new(
                    VALIDATION,
                    "Provided list of item keys contains duplicates",
                ));
            }
        }
        for item in items {
            stored.upsert(item.clone());
        }
        Ok(())
    }

    async fn query(&self, table: &str, request: &QueryRequest) -> Result<Vec<Item>, DriverError> {
        self.check_credentials()?;
        let mut tables = self.tables.write().await;
        let stored = active_table(&mut tables, table)?;

        let mut matching: Vec<&Item> = stored
            .items
            .iter()
            .filter(|item| item.get(&request.partition_name) == Some(&request.partition_value))
            .collect();

        if let Some(sort) = stored.definition.sort_key() {
            matching.sort_by(|a, b| compare_sort_values(a.get(&sort.name), b.get(&sort.name), sort));
        }
        if !request.scan_forward {
            matching.reverse();
        }
        if let Some(limit) = request.limit {
            matching.truncate(limit);
        }

        Ok(matching.into_iter().map(encode_item).collect())
    }

    async fn create_table(
        &self,
        table: &str,
        definition: &TableDefinition,
    ) -> Result<(), DriverError> {
        self.check_credentials()?;
        let mut tables = self.tables.write().await;
        if tables.contains_key(table) {
            return Err(DriverError::new(
                RESOURCE_IN_USE,
                format!("Table already exists: {table}"),
            ));
        }

        tables.insert(
            table.to_string(),
            MemoryTable {
                definition: definition.clone(),
                items: Vec::new(),
                pending_polls: self.activation_polls,
            },
        );
        tracing::debug!(table, "created in-memory table");
        Ok(())
    }

    async fn describe_table(&self, table: &str) -> Result<Option<TableStatus>, DriverError> {
        self.check_credentials()?;
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.get_mut(table) else {
            return Ok(None);
        };

        if stored.pending_polls > 0 {
            stored.pending_polls -= 1;
            return Ok(Some(TableStatus::Creating));
        }
        Ok(Some(TableStatus::Active))
    }
}
