//! DynamoDB storage driver.
//!
//! Implements `finsync_core::storage::StoreDriver` over `aws-sdk-dynamodb`.
//! Error classification, input validation and retries live in the
//! storage client; this module only moves items and errors across the SDK.

mod conversions;
mod driver;
mod error;

pub use driver::DynamoDbDriver;
