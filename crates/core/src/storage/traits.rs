use async_trait::async_trait;

use super::classify::DriverError;
use super::codec::Item;
use super::error::{StorageError, StorageResult};
use super::keys::{KeySchema, TableDefinition};
use super::query::{Query, QueryRequest};

/// Lifecycle state of a table as reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Creating,
    Updating,
    Deleting,
    Active,
}

/// The primitive operations of a key-value store.
///
/// Implementations talk to the actual store and report failures as opaque
/// [`DriverError`]s. Outbound items are plain; query results come back in
/// the store's tagged wire form.
#[async_trait]
pub trait StoreDriver: Send + Sync {
    /// Stores a single item.
    async fn put_item(&self, table: &str, item: &Item) -> Result<(), DriverError>;

    /// Stores a batch of items.
    async fn batch_put_items(&self, table: &str, items: &[Item]) -> Result<(), DriverError>;

    /// Returns every item in one partition, tagged.
    async fn query(&self, table: &str, request: &QueryRequest) -> Result<Vec<Item>, DriverError>;

    /// Issues a create-table request. Creation completes asynchronously.
    async fn create_table(
        &self,
        table: &str,
        definition: &TableDefinition,
    ) -> Result<(), DriverError>;

    /// Returns the table status, or `None` if the table does not exist.
    async fn describe_table(&self, table: &str) -> Result<Option<TableStatus>, DriverError>;
}

/// Storage operations the domain models depend on.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Stores one item in `table`.
    async fn add_item(&self, item: &Item, table: &str) -> StorageResult<()>;

    /// Stores a batch of items in `table`.
    async fn add_items(&self, items: &[Item], table: &str) -> StorageResult<()>;

    /// Creates `name` with the given key schema and waits until it is active.
    async fn create_table(&self, key: &KeySchema, name: &str) -> StorageResult<()>;

    /// Waits until `table` can be read from and written to.
    async fn wait_until_active(&self, table: &str) -> StorageResult<()>;

    /// Lists the items of one partition, decoded to plain values.
    async fn list_items(&self, query: &Query) -> StorageResult<Vec<Item>>;

    /// Creates the table on the first missing-table failure, then writes once more.
    async fn add_item_and_create_table(
        &self,
        item: &Item,
        key: &KeySchema,
        table: &str,
    ) -> StorageResult<()> {
        key.validate()?;
        match self.add_item(item, table).await {
            Err(StorageError::MissingTable { .. }) => {
                self.provision_table(key, table).await?;
                self.add_item(item, table).await
            }
            result => result,
        }
    }

    /// Batch variant of [`Storage::add_item_and_create_table`].
    async fn add_items_and_create_table(
        &self,
        items: &[Item],
        key: &KeySchema,
        table: &str,
    ) -> StorageResult<()> {
        key.validate()?;
        match self.add_items(items, table).await {
            Err(StorageError::MissingTable { .. }) => {
                self.provision_table(key, table).await?;
                self.add_items(items, table).await
            }
            result => result,
        }
    }

    /// Creates a table that a write found missing.
    ///
    /// Losing a creation race to a concurrent caller is not a failure: the
    /// table is waited on and the write proceeds.
    async fn provision_table(&self, key: &KeySchema, table: &str) -> StorageResult<()> {
        tracing::info!(table, "table missing, creating before retrying write");
        match self.create_table(key, table).await {
            Err(StorageError::TableExists { .. }) => {
                tracing::info!(table, "table created concurrently, waiting for it");
                self.wait_until_active(table).await
            }
            result => result,
        }
    }
}
