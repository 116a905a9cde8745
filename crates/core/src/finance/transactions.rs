use std::sync::Arc;

use serde_json::Value;

use crate::storage::{InputError, Item, Query, Storage, StorageError, StorageResult};
use crate::timestamp;

use super::conversions::{from_item, raw_to_transaction, to_item};
use super::tables::{self, TRANSACTIONS, USER_KEY};
use super::types::Transaction;

/// A user's imported transactions.
pub struct Transactions {
    storage: Arc<dyn Storage>,
    table: String,
    user: String,
}

impl Transactions {
    pub fn new(environment: &str, storage: Arc<dyn Storage>, user: &str) -> Result<Self, InputError> {
        if environment.is_empty() {
            return Err(InputError::new("environment"));
        }
        if user.is_empty() {
            return Err(InputError::new("user"));
        }
        Ok(Self {
            storage,
            table: tables::table_name(environment, TRANSACTIONS),
            user: user.to_string(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Converts aggregator records and stores them in one batch.
    ///
    /// Nothing is written unless every record converts and no transaction id
    /// appears twice.
    pub async fn create(&self, raw: &[Value]) -> StorageResult<Vec<Transaction>> {
        if raw.is_empty() {
            return Err(InputError::new("transactions").into());
        }

        let now = timestamp::now();
        let transactions = raw
            .iter()
            .enumerate()
            .map(|(i, record)| {
                raw_to_transaction(record, &self.user, now, &format!("transactions[{i}]"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (i, transaction) in transactions.iter().enumerate() {
            let repeated = transactions[..i]
                .iter()
                .any(|earlier| earlier.transaction_id == transaction.transaction_id);
            if repeated {
                let parent = format!("transactions[{i}]");
                return Err(InputError::nested("transaction_id", parent).into());
            }
        }

        let items = transactions
            .iter()
            .map(to_item)
            .collect::<StorageResult<Vec<Item>>>()?;
        self.storage
            .add_items_and_create_table(&items, &tables::transactions_key(), &self.table)
            .await?;

        tracing::info!(table = %self.table, count = items.len(), "stored transactions");
        Ok(transactions)
    }

    /// Lists the user's transactions, pending before posted, oldest first.
    pub async fn list(&self) -> StorageResult<Vec<Transaction>> {
        let query = Query::partition(&self.table, USER_KEY, Value::String(self.user.clone()));
        let items = match self.storage.list_items(&query).await {
            Ok(items) => items,
            Err(StorageError::MissingTable { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        items.into_iter().map(from_item).collect()
    }
}
