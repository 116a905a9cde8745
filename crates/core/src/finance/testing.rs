//! Recording storage stub shared by the model tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::storage::{Item, KeySchema, Query, Storage, StorageResult};

#[derive(Debug, Clone)]
pub struct RecordedWrite {
    pub items: Vec<Item>,
    pub key: KeySchema,
    pub table: String,
}

#[derive(Default)]
pub struct StorageStub {
    writes: Mutex<Vec<RecordedWrite>>,
    queries: Mutex<Vec<Query>>,
    list_result: Mutex<Option<StorageResult<Vec<Item>>>>,
    write_result: Mutex<Option<StorageResult<()>>>,
}

impl StorageStub {
    pub fn listing(result: StorageResult<Vec<Item>>) -> Arc<Self> {
        let stub = Self::default();
        *stub.list_result.lock().unwrap() = Some(result);
        Arc::new(stub)
    }

    pub fn failing_writes(result: StorageResult<()>) -> Arc<Self> {
        let stub = Self::default();
        *stub.write_result.lock().unwrap() = Some(result);
        Arc::new(stub)
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<Query> {
        self.queries.lock().unwrap().clone()
    }

    fn record(&self, items: Vec<Item>, key: &KeySchema, table: &str) -> StorageResult<()> {
        self.writes.lock().unwrap().push(RecordedWrite {
            items,
            key: key.clone(),
            table: table.to_string(),
        });
        self.write_result.lock().unwrap().clone().unwrap_or(Ok(()))
    }
}

#[async_trait]
impl Storage for StorageStub {
    async fn add_item(&self, _item: &Item, _table: &str) -> StorageResult<()> {
        unreachable!("models write through add_item_and_create_table")
    }

    async fn add_items(&self, _items: &[Item], _table: &str) -> StorageResult<()> {
        unreachable!("models write through add_items_and_create_table")
    }

    async fn create_table(&self, _key: &KeySchema, _name: &str) -> StorageResult<()> {
        Ok(())
    }

    async fn wait_until_active(&self, _table: &str) -> StorageResult<()> {
        Ok(())
    }

    async fn list_items(&self, query: &Query) -> StorageResult<Vec<Item>> {
        self.queries.lock().unwrap().push(query.clone());
        self.list_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Ok(Vec::new()))
    }

    async fn add_item_and_create_table(
        &self,
        item: &Item,
        key: &KeySchema,
        table: &str,
    ) -> StorageResult<()> {
        self.record(vec![item.clone()], key, table)
    }

    async fn add_items_and_create_table(
        &self,
        items: &[Item],
        key: &KeySchema,
        table: &str,
    ) -> StorageResult<()> {
        self.record(items.to_vec(), key, table)
    }
}
