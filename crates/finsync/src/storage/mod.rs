//! Store driver implementations.
//!
//! This module provides concrete implementations of the `StoreDriver` trait
//! defined in `finsync_core::storage`. Drivers are selected at compile time
//! via feature flags and at run time via `--backend`.
//!
//! # Feature Flags
//!
//! - `dynamodb` (default): AWS DynamoDB driver using `aws-sdk-dynamodb`
//! - `inmemory` (default): in-memory driver for tests and local runs
//!
//! # Examples
//!
//! Build with DynamoDB only:
//! ```bash
//! cargo build -p finsync --no-default-features --features dynamodb
//! ```

#[cfg(not(any(feature = "dynamodb", feature = "inmemory")))]
compile_error!(
    "No storage driver selected. Enable 'dynamodb' or 'inmemory' feature. \
    Example: cargo build -p finsync --features dynamodb"
);

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

#[cfg(feature = "inmemory")]
pub mod inmemory;

use std::sync::Arc;

use anyhow::Result;
use clap::ValueEnum;
use finsync_core::storage::{Storage, StorageClient};

use crate::config::Config;

/// Store driver selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// AWS DynamoDB, or a compatible local endpoint.
    Dynamodb,
    /// Process-local tables, discarded on exit.
    Memory,
}

/// Builds the storage client for `backend`.
pub async fn connect(config: &Config, backend: Backend) -> Result<Arc<dyn Storage>> {
    let provisioning = config.provisioning();

    match backend {
        #[cfg(feature = "dynamodb")]
        Backend::Dynamodb => {
            let driver = dynamodb::DynamoDbDriver::from_config(config).await;
            tracing::debug!(
                region = %config.storage_region,
                endpoint = ?config.endpoint_url,
                static_credentials = config.credentials().is_some(),
                "using DynamoDB driver"
            );
            Ok(Arc::new(StorageClient::new(driver, provisioning)))
        }
        #[cfg(feature = "inmemory")]
        Backend::Memory => {
            tracing::debug!("using in-memory driver");
            Ok(Arc::new(StorageClient::new(
                inmemory::InMemoryDriver::new(),
                provisioning,
            )))
        }
        #[allow(unreachable_patterns)]
        other => anyhow::bail!("backend {other:?} is not compiled into this build"),
    }
}
