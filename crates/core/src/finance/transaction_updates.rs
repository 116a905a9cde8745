use std::sync::Arc;

use serde_json::Value;

use crate::storage::{InputError, Query, Storage, StorageError, StorageResult};
use crate::timestamp;

use super::conversions::{from_item, to_item};
use super::tables::{self, TRANSACTION_UPDATES, USER_KEY};
use super::types::{CreateTransactionUpdateRequest, TransactionUpdate};

/// A user's transaction update runs, keyed by creation time.
pub struct TransactionUpdates {
    storage: Arc<dyn Storage>,
    table: String,
    user: String,
}

impl TransactionUpdates {
    pub fn new(environment: &str, storage: Arc<dyn Storage>, user: &str) -> Result<Self, InputError> {
        if environment.is_empty() {
            return Err(InputError::new("environment"));
        }
        if user.is_empty() {
            return Err(InputError::new("user"));
        }
        Ok(Self {
            storage,
            table: tables::table_name(environment, TRANSACTION_UPDATES),
            user: user.to_string(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Records the start of an update over `request.connections`.
    pub async fn create(
        &self,
        request: CreateTransactionUpdateRequest,
    ) -> StorageResult<TransactionUpdate> {
        if request.connections.is_empty() || request.connections.iter().any(String::is_empty) {
            return Err(InputError::new("connections").into());
        }

        let now = timestamp::now();
        let update = TransactionUpdate {
            user: self.user.clone(),
            connections: request.connections,
            created_date: now,
            modified_date: now,
            finished_date: None,
            error: None,
        };

        let item = to_item(&update)?;
        self.storage
            .add_item_and_create_table(&item, &tables::transaction_updates_key(), &self.table)
            .await?;

        tracing::info!(
            table = %self.table,
            connections = update.connections.len(),
            "started transaction update"
        );
        Ok(update)
    }

    /// The most recently created update, if any.
    pub async fn get_latest(&self) -> StorageResult<Option<TransactionUpdate>> {
        let query = Query::partition(&self.table, USER_KEY, Value::String(self.user.clone()))
            .reversed()
            .limit(1);
        let items = match self.storage.list_items(&query).await {
            Ok(items) => items,
            Err(StorageError::MissingTable { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        items.into_iter().next().map(from_item).transpose()
    }
}
