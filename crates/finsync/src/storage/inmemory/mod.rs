//! In-memory storage driver for testing and local runs.
//!
//! Tables live in a `HashMap` behind `Arc<RwLock<_>>`. Key validation, sort
//! order and error reporting follow the hosted store closely enough that the
//! storage client and the finance models can be exercised end to end.
//!
//! # Example
//!
//! ```rust,ignore
//! use finsync::storage::inmemory::InMemoryDriver;
//! use finsync_core::storage::{ProvisioningConfig, StorageClient};
//!
//! let storage = StorageClient::new(InMemoryDriver::new(), ProvisioningConfig::default());
//! ```

mod driver;

pub use driver::InMemoryDriver;
