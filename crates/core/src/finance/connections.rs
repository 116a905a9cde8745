use std::sync::Arc;

use serde_json::Value;

use crate::storage::{InputError, Query, Storage, StorageError, StorageResult};
use crate::timestamp;

use super::conversions::{from_item, to_item};
use super::tables::{self, CONNECTIONS, USER_KEY};
use super::types::{Connection, CreateConnectionRequest};

/// A user's stored connections.
pub struct Connections {
    storage: Arc<dyn Storage>,
    table: String,
    user: String,
}

impl Connections {
    pub fn new(environment: &str, storage: Arc<dyn Storage>, user: &str) -> Result<Self, InputError> {
        if environment.is_empty() {
            return Err(InputError::new("environment"));
        }
        if user.is_empty() {
            return Err(InputError::new("user"));
        }
        Ok(Self {
            storage,
            table: tables::table_name(environment, CONNECTIONS),
            user: user.to_string(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Stores a new connection, creating the table on first use.
    pub async fn create(&self, request: CreateConnectionRequest) -> StorageResult<Connection> {
        validate_create(&request)?;

        let now = timestamp::now();
        let connection = Connection {
            id: request.id,
            name: request.name,
            token: request.token,
            user: self.user.clone(),
            created_date: now,
            modified_date: now,
        };

        let item = to_item(&connection)?;
        self.storage
            .add_item_and_create_table(&item, &tables::connections_key(), &self.table)
            .await?;

        tracing::info!(table = %self.table, id = %connection.id, "stored connection");
        Ok(connection)
    }

    /// Lists the user's connections. A table that was never created holds none.
    pub async fn list(&self) -> StorageResult<Vec<Connection>> {
        let query = Query::partition(&self.table, USER_KEY, Value::String(self.user.clone()));
        let items = match self.storage.list_items(&query).await {
            Ok(items) => items,
            Err(StorageError::MissingTable { .. }) => {
                tracing::debug!(table = %self.table, "connections table not created yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };
        items.into_iter().map(from_item).collect()
    }
}

fn validate_create(request: &CreateConnectionRequest) -> Result<(), InputError> {
    if request.id.is_empty() {
        return Err(InputError::new("id"));
    }
    if request.name.is_empty() {
        return Err(InputError::new("name"));
    }
    if request.token.is_empty() {
        return Err(InputError::new("token"));
    }
    Ok(())
}
