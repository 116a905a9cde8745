//! DynamoDB store driver.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::config::Credentials;
use aws_sdk_dynamodb::types::{AttributeValue, PutRequest, WriteRequest};
use aws_sdk_dynamodb::Client;

use finsync_core::storage::{
    DriverError, Item, QueryRequest, StoreDriver, TableDefinition, TableStatus,
};

use super::conversions::{
    attributes_to_tagged, item_to_attributes, table_definition_parts, to_table_status,
    value_to_attribute,
};
use super::error::{build_error, map_sdk_error, UNPROCESSED_ITEMS};
use crate::config::Config;

/// `BatchWriteItem` accepts at most this many requests.
pub const BATCH_WRITE_LIMIT: usize = 25;

/// Store driver backed by `aws-sdk-dynamodb`.
pub struct DynamoDbDriver {
    client: Client,
}

impl DynamoDbDriver {
    /// Creates a driver over an existing client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a driver from application configuration.
    ///
    /// Uses the configured static credentials when both halves are present,
    /// otherwise the SDK default credential chain.
    pub async fn from_config(config: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.storage_region.clone()));

        if let Some((id, secret)) = config.credentials() {
            loader = loader.credentials_provider(Credentials::new(id, secret, None, None, "finsync"));
        }

        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config))
    }
}

fn write_requests(items: &[Item]) -> Result<Vec<WriteRequest>, DriverError> {
    items
        .iter()
        .map(|item| {
            let put = PutRequest::builder()
                .set_item(Some(item_to_attributes(item)))
                .build()
                .map_err(build_error)?;
            Ok(WriteRequest::builder().put_request(put).build())
        })
        .collect()
}

#[async_trait]
impl StoreDriver for DynamoDbDriver {
    async fn put_item(&self, table: &str, item: &Item) -> Result<(), DriverError> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item_to_attributes(item)))
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn batch_put_items(&self, table: &str, items: &[Item]) -> Result<(), DriverError> {
        let requests = write_requests(items)?;

        for (index, batch) in requests.chunks(BATCH_WRITE_LIMIT).enumerate() {
            let output = self
                .client
                .batch_write_item()
                .request_items(table, batch.to_vec())
                .send()
                .await
                .map_err(map_sdk_error)?;

            let unprocessed: usize = output
                .unprocessed_items
                .unwrap_or_default()
                .values()
                .map(Vec::len)
                .sum();
            if unprocessed > 0 {
                return Err(DriverError::new(
                    UNPROCESSED_ITEMS,
                    format!("{unprocessed} items in batch {index} were not written"),
                ));
            }
        }

        tracing::debug!(table, count = items.len(), "batch written");
        Ok(())
    }

    async fn query(&self, table: &str, request: &QueryRequest) -> Result<Vec<Item>, DriverError> {
        let mut items = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let remaining = request.limit.map(|limit| limit.saturating_sub(items.len()));
            let output = self
                .client
                .query()
                .table_name(table)
                .key_condition_expression("#pk = :pk")
                .expression_attribute_names("#pk", &request.partition_name)
                .expression_attribute_values(":pk", value_to_attribute(&request.partition_value))
                .scan_index_forward(request.scan_forward)
                .set_limit(remaining.map(|n| i32::try_from(n).unwrap_or(i32::MAX)))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(map_sdk_error)?;

            items.extend(output.items.unwrap_or_default().iter().map(attributes_to_tagged));

            let reached_limit = request.limit.is_some_and(|limit| items.len() >= limit);
            match output.last_evaluated_key {
                Some(key) if !key.is_empty() && !reached_limit => start_key = Some(key),
                _ => break,
            }
        }

        Ok(items)
    }

    async fn create_table(
        &self,
        table: &str,
        definition: &TableDefinition,
    ) -> Result<(), DriverError> {
        let parts = table_definition_parts(definition)?;

        self.client
            .create_table()
            .table_name(table)
            .set_key_schema(Some(parts.key_schema))
            .set_attribute_definitions(Some(parts.attribute_definitions))
            .billing_mode(parts.billing_mode)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn describe_table(&self, table: &str) -> Result<Option<TableStatus>, DriverError> {
        match self.client.describe_table().table_name(table).send().await {
            Ok(output) => Ok(output
                .table()
                .and_then(|description| description.table_status())
                .map(to_table_status)),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception()) =>
            {
                Ok(None)
            }
            Err(err) => Err(map_sdk_error(err)),
        }
    }
}
