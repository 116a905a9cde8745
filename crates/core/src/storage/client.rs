//! The storage client.
//!
//! A stateless façade over a [`StoreDriver`]: validates input before any I/O,
//! classifies driver failures and decodes query results.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::classify::classify;
use super::codec::{decode_item, Item};
use super::error::{InputError, StorageError, StorageResult};
use super::keys::KeySchema;
use super::query::Query;
use super::traits::{Storage, StoreDriver, TableStatus};

/// How long and how often to poll a newly created table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisioningConfig {
    /// Delay before the second status check.
    pub poll_interval: Duration,
    /// Upper bound for the doubling delay between checks.
    pub max_poll_interval: Duration,
    /// Give up once this much time has passed.
    pub timeout: Duration,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            max_poll_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Shortest delay between table status checks, whatever the configuration.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

impl ProvisioningConfig {
    /// Delay before poll number `attempt` (0-based), doubling up to the cap.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.poll_interval
            .saturating_mul(factor)
            .min(self.max_poll_interval)
            .max(MIN_POLL_INTERVAL)
    }
}

/// Storage client over a concrete store driver.
pub struct StorageClient<D> {
    driver: D,
    provisioning: ProvisioningConfig,
}

impl<D: StoreDriver> StorageClient<D> {
    pub fn new(driver: D, provisioning: ProvisioningConfig) -> Self {
        Self {
            driver,
            provisioning,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn provisioning(&self) -> &ProvisioningConfig {
        &self.provisioning
    }
}

fn validate_item(item: &Item, field: &str) -> Result<(), InputError> {
    if item.is_empty() {
        return Err(InputError::new(field));
    }
    Ok(())
}

fn validate_table(table: &str) -> Result<(), InputError> {
    if table.is_empty() {
        return Err(InputError::new("table"));
    }
    Ok(())
}

fn log_failure(error: &StorageError, table: &str, operation: &'static str) {
    tracing::warn!(table, operation, error = %error, "storage operation failed");
}

#[async_trait]
impl<D: StoreDriver> Storage for StorageClient<D> {
    async fn add_item(&self, item: &Item, table: &str) -> StorageResult<()> {
        validate_item(item, "item")?;
        validate_table(table)?;

        tracing::debug!(table, "putting item");
        self.driver.put_item(table, item).await.map_err(|e| {
            let error = classify(e, table);
            log_failure(&error, table, "put_item");
            error
        })
    }

    async fn add_items(&self, items: &[Item], table: &str) -> StorageResult<()> {
        if items.is_empty() {
            return Err(InputError::new("items").into());
        }
        for item in items {
            validate_item(item, "items")?;
        }
        validate_table(table)?;

        tracing::debug!(table, count = items.len(), "putting item batch");
        self.driver.batch_put_items(table, items).await.map_err(|e| {
            let error = classify(e, table);
            log_failure(&error, table, "batch_put_items");
            error
        })
    }

    async fn create_table(&self, key: &KeySchema, name: &str) -> StorageResult<()> {
        key.validate()?;
        if name.is_empty() {
            return Err(InputError::new("name").into());
        }

        let definition = key.table_definition();
        self.driver
            .create_table(name, &definition)
            .await
            .map_err(|e| {
                let error = classify(e, name);
                log_failure(&error, name, "create_table");
                error
            })?;

        self.wait_until_active(name).await?;
        tracing::info!(table = name, "created table");
        Ok(())
    }

    async fn wait_until_active(&self, table: &str) -> StorageResult<()> {
        let started = Instant::now();
        let mut attempt = 0;

        loop {
            let status = self
                .driver
                .describe_table(table)
                .await
                .map_err(|e| classify(e, table))?;

            if status == Some(TableStatus::Active) {
                return Ok(());
            }

            let delay = self.provisioning.delay_for(attempt);
            if started.elapsed() + delay > self.provisioning.timeout {
                tracing::warn!(table, ?status, "table did not become active in time");
                return Err(StorageError::ProvisioningTimeout {
                    table: table.to_string(),
                });
            }

            tracing::debug!(table, ?status, attempt, "waiting for table to become active");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn list_items(&self, query: &Query) -> StorageResult<Vec<Item>> {
        let request = query.to_request()?;
        let table = query.table.as_str();

        tracing::debug!(
            table,
            partition = %request.partition_name,
            reverse = query.should_reverse,
            limit = ?query.limit,
            "querying partition"
        );

        let items = self.driver.query(table, &request).await.map_err(|e| {
            let error = classify(e, table);
            log_failure(&error, table, "query");
            error
        })?;

        Ok(items.iter().map(decode_item).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::storage::classify::{DriverError, RESOURCE_IN_USE, RESOURCE_NOT_FOUND};
    use crate::storage::keys::{KeyAttribute, TableDefinition};
    use crate::storage::query::QueryRequest;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Put(String),
        BatchPut(String, usize),
        Query(String, QueryRequest),
        CreateTable(String, TableDefinition),
        Describe(String),
    }

    /// Scripted driver: each operation pops its next outcome, defaulting to success.
    #[derive(Default, Clone)]
    struct ScriptedDriver {
        calls: Arc<Mutex<Vec<Call>>>,
        put_results: Arc<Mutex<VecDeque<Result<(), DriverError>>>>,
        create_results: Arc<Mutex<VecDeque<Result<(), DriverError>>>>,
        statuses: Arc<Mutex<VecDeque<Option<TableStatus>>>>,
        query_result: Arc<Mutex<Option<Result<Vec<Item>, DriverError>>>>,
    }

    impl ScriptedDriver {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn push_put(&self, result: Result<(), DriverError>) {
            self.put_results.lock().unwrap().push_back(result);
        }

        fn push_create(&self, result: Result<(), DriverError>) {
            self.create_results.lock().unwrap().push_back(result);
        }

        fn push_status(&self, status: Option<TableStatus>) {
            self.statuses.lock().unwrap().push_back(status);
        }

        fn writes(&self) -> usize {
            self.calls()
                .iter()
                .filter(|c| matches!(c, Call::Put(_) | Call::BatchPut(..)))
                .count()
        }

        fn creates(&self) -> Vec<TableDefinition> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::CreateTable(_, definition) => Some(definition),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl StoreDriver for ScriptedDriver {
        async fn put_item(&self, table: &str, _item: &Item) -> Result<(), DriverError> {
            self.calls.lock().unwrap().push(Call::Put(table.to_string()));
            self.put_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
        }

        async fn batch_put_items(&self, table: &str, items: &[Item]) -> Result<(), DriverError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::BatchPut(table.to_string(), items.len()));
            self.put_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
        }

        async fn query(
            &self,
            table: &str,
            request: &QueryRequest,
        ) -> Result<Vec<Item>, DriverError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Query(table.to_string(), request.clone()));
            self.query_result
                .lock()
                .unwrap()
                .clone()
                .unwrap_or(Ok(Vec::new()))
        }

        async fn create_table(
            &self,
            table: &str,
            definition: &TableDefinition,
        ) -> Result<(), DriverError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::CreateTable(table.to_string(), definition.clone()));
            self.create_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(()))
        }

        async fn describe_table(&self, table: &str) -> Result<Option<TableStatus>, DriverError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Describe(table.to_string()));
            Ok(self
                .statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Some(TableStatus::Active)))
        }
    }

    fn fast_provisioning() -> ProvisioningConfig {
        ProvisioningConfig {
            poll_interval: Duration::from_millis(1),
            max_poll_interval: Duration::from_millis(4),
            timeout: Duration::from_millis(200),
        }
    }

    fn client(driver: &ScriptedDriver) -> StorageClient<ScriptedDriver> {
        StorageClient::new(driver.clone(), fast_provisioning())
    }

    fn item() -> Item {
        json!({ "user": "u1", "token": "tok1" })
            .as_object()
            .unwrap()
            .clone()
    }

    fn key() -> KeySchema {
        KeySchema::new(KeyAttribute::string("user")).with_sort(KeyAttribute::string("token"))
    }

    fn missing_table() -> DriverError {
        DriverError::new(RESOURCE_NOT_FOUND, "Requested resource not found")
    }

    #[tokio::test]
    async fn test_add_item_rejects_empty_item_before_io() {
        let driver = ScriptedDriver::default();
        let err = client(&driver)
            .add_item(&Item::new(), "t")
            .await
            .unwrap_err();
        assert_eq!(err, StorageError::Input(InputError::new("item")));
        assert!(driver.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_item_rejects_empty_table_before_io() {
        let driver = ScriptedDriver::default();
        let err = client(&driver).add_item(&item(), "").await.unwrap_err();
        assert_eq!(err, StorageError::Input(InputError::new("table")));
        assert!(driver.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_item_classifies_missing_table() {
        let driver = ScriptedDriver::default();
        driver.push_put(Err(missing_table()));
        let err = client(&driver)
            .add_item(&item(), "dev-connections")
            .await
            .unwrap_err();
        assert_eq!(err, StorageError::missing_table("dev-connections"));
    }

    #[tokio::test]
    async fn test_add_items_rejects_empty_batch_and_empty_members() {
        let driver = ScriptedDriver::default();
        let client = client(&driver);

        let err = client.add_items(&[], "t").await.unwrap_err();
        assert_eq!(err, StorageError::Input(InputError::new("items")));

        let err = client
            .add_items(&[item(), Item::new()], "t")
            .await
            .unwrap_err();
        assert_eq!(err, StorageError::Input(InputError::new("items")));
        assert!(driver.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_items_issues_one_batch() {
        let driver = ScriptedDriver::default();
        client(&driver)
            .add_items(&[item(), item()], "t")
            .await
            .unwrap();
        assert_eq!(driver.calls(), vec![Call::BatchPut("t".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_create_table_waits_until_active() {
        let driver = ScriptedDriver::default();
        driver.push_status(None);
        driver.push_status(Some(TableStatus::Creating));
        driver.push_status(Some(TableStatus::Active));

        client(&driver).create_table(&key(), "t").await.unwrap();

        let describes = driver
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Describe(_)))
            .count();
        assert_eq!(describes, 3);
        assert_eq!(driver.creates(), vec![key().table_definition()]);
    }

    #[tokio::test]
    async fn test_create_table_times_out_when_never_active() {
        let driver = ScriptedDriver::default();
        for _ in 0..1_000 {
            driver.push_status(Some(TableStatus::Creating));
        }

        let err = client(&driver).create_table(&key(), "t").await.unwrap_err();
        assert_eq!(
            err,
            StorageError::ProvisioningTimeout {
                table: "t".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_create_table_classifies_existing_table() {
        let driver = ScriptedDriver::default();
        driver.push_create(Err(DriverError::new(
            RESOURCE_IN_USE,
            "Table already exists: t",
        )));
        let err = client(&driver).create_table(&key(), "t").await.unwrap_err();
        assert_eq!(err, StorageError::table_exists("t"));
    }

    #[tokio::test]
    async fn test_create_table_rejects_invalid_key_before_io() {
        let driver = ScriptedDriver::default();
        let key = KeySchema::new(KeyAttribute::string(""));
        let err = client(&driver).create_table(&key, "t").await.unwrap_err();
        assert_eq!(
            err,
            StorageError::Input(InputError::nested("name", "partition"))
        );
        assert!(driver.calls().is_empty());
    }

    #[tokio::test]
    async fn test_list_items_decodes_results() {
        let driver = ScriptedDriver::default();
        *driver.query_result.lock().unwrap() = Some(Ok(vec![json!({
            "user": { "S": "u1" },
            "amount": { "N": "3.5" }
        })
        .as_object()
        .unwrap()
        .clone()]));

        let items = client(&driver)
            .list_items(&Query::partition("t", "user", json!("u1")).reversed().limit(1))
            .await
            .unwrap();

        assert_eq!(
            items,
            vec![json!({ "user": "u1", "amount": 3.5 })
                .as_object()
                .unwrap()
                .clone()]
        );
        assert_eq!(
            driver.calls(),
            vec![Call::Query(
                "t".to_string(),
                QueryRequest {
                    partition_name: "user".to_string(),
                    partition_value: json!("u1"),
                    scan_forward: false,
                    limit: Some(1),
                }
            )]
        );
    }

    #[tokio::test]
    async fn test_list_items_classifies_missing_table() {
        let driver = ScriptedDriver::default();
        *driver.query_result.lock().unwrap() = Some(Err(missing_table()));
        let err = client(&driver)
            .list_items(&Query::partition("t", "user", json!("u1")))
            .await
            .unwrap_err();
        assert!(err.is_missing_table());
    }

    #[tokio::test]
    async fn test_composite_write_with_existing_table_writes_once() {
        let driver = ScriptedDriver::default();
        client(&driver)
            .add_item_and_create_table(&item(), &key(), "t")
            .await
            .unwrap();
        assert_eq!(driver.calls(), vec![Call::Put("t".to_string())]);
    }

    #[tokio::test]
    async fn test_composite_write_creates_table_and_retries_once() {
        let driver = ScriptedDriver::default();
        driver.push_put(Err(missing_table()));

        client(&driver)
            .add_item_and_create_table(&item(), &key(), "t")
            .await
            .unwrap();

        assert_eq!(driver.writes(), 2);
        assert_eq!(driver.creates(), vec![key().table_definition()]);
    }

    #[tokio::test]
    async fn test_composite_write_gives_up_after_second_missing_table() {
        let driver = ScriptedDriver::default();
        driver.push_put(Err(missing_table()));
        driver.push_put(Err(missing_table()));
        driver.push_put(Err(missing_table()));

        let err = client(&driver)
            .add_item_and_create_table(&item(), &key(), "t")
            .await
            .unwrap_err();

        assert!(err.is_missing_table());
        assert_eq!(driver.writes(), 2);
        assert_eq!(driver.creates().len(), 1);
    }

    #[tokio::test]
    async fn test_composite_write_propagates_other_errors_without_retry() {
        let driver = ScriptedDriver::default();
        driver.push_put(Err(DriverError::new(
            "UnrecognizedClientException",
            "The security token included in the request is invalid",
        )));

        let err = client(&driver)
            .add_item_and_create_table(&item(), &key(), "t")
            .await
            .unwrap_err();

        assert_eq!(err, StorageError::Authentication);
        assert_eq!(driver.writes(), 1);
        assert!(driver.creates().is_empty());
    }

    #[tokio::test]
    async fn test_composite_write_continues_after_losing_creation_race() {
        let driver = ScriptedDriver::default();
        driver.push_put(Err(missing_table()));
        driver.push_create(Err(DriverError::new(
            RESOURCE_IN_USE,
            "Attempt to change a resource which is still in use: Table is being created",
        )));
        driver.push_status(Some(TableStatus::Creating));

        client(&driver)
            .add_item_and_create_table(&item(), &key(), "t")
            .await
            .unwrap();

        assert_eq!(driver.writes(), 2);
    }

    #[tokio::test]
    async fn test_batch_composite_write_creates_table_and_retries_once() {
        let driver = ScriptedDriver::default();
        driver.push_put(Err(missing_table()));

        client(&driver)
            .add_items_and_create_table(&[item(), item()], &key(), "t")
            .await
            .unwrap();

        assert_eq!(
            driver
                .calls()
                .into_iter()
                .filter(|c| matches!(c, Call::BatchPut(_, 2)))
                .count(),
            2
        );
        assert_eq!(driver.creates().len(), 1);
    }

    #[tokio::test]
    async fn test_composite_write_rejects_invalid_key_before_io() {
        let driver = ScriptedDriver::default();
        let key = KeySchema::new(KeyAttribute::string("user")).with_sort(KeyAttribute::string(""));
        let err = client(&driver)
            .add_items_and_create_table(&[item()], &key, "t")
            .await
            .unwrap_err();
        assert_eq!(err, StorageError::Input(InputError::nested("name", "sort")));
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn test_poll_delay_doubles_up_to_cap() {
        let config = ProvisioningConfig {
            poll_interval: Duration::from_millis(100),
            max_poll_interval: Duration::from_millis(350),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(config.delay_for(0), Duration::from_millis(100));
        assert_eq!(config.delay_for(1), Duration::from_millis(200));
        assert_eq!(config.delay_for(2), Duration::from_millis(350));
        assert_eq!(config.delay_for(40), Duration::from_millis(350));
    }

    #[test]
    fn test_zero_poll_interval_is_floored() {
        let config = ProvisioningConfig {
            poll_interval: Duration::ZERO,
            max_poll_interval: Duration::ZERO,
            timeout: Duration::from_secs(1),
        };
        assert_eq!(config.delay_for(0), MIN_POLL_INTERVAL);
        assert_eq!(config.delay_for(5), MIN_POLL_INTERVAL);
    }
}
