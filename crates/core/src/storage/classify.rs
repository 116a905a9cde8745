//! Classification of low-level store errors.
//!
//! The store driver reports failures as an opaque name and message. These
//! pure functions match the store's documented error names and message
//! prefixes and map them onto [`StorageError`]. Anything unrecognised is
//! passed through as [`StorageError::Unclassified`].

use thiserror::Error;

use super::error::StorageError;

/// An opaque error reported by a store driver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{name}: {message}")]
pub struct DriverError {
    pub name: String,
    pub message: String,
}

impl DriverError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

pub const INVALID_SIGNATURE: &str = "InvalidSignatureException";
pub const UNRECOGNIZED_CLIENT: &str = "UnrecognizedClientException";
pub const VALIDATION: &str = "ValidationException";
pub const RESOURCE_IN_USE: &str = "ResourceInUseException";
pub const RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";

pub const MISSING_CREDENTIALS_PREFIX: &str = "Missing credentials";
pub const MISSING_KEY_PREFIX: &str = "One or more parameter values were invalid: Missing the key";
pub const KEY_TYPE_MISMATCH_PREFIX: &str =
    "One or more parameter values were invalid: Type mismatch for key";
pub const TABLE_EXISTS_PREFIX: &str = "Table already exists";
pub const TABLE_IN_USE_PREFIX: &str = "Attempt to change a resource which is still in use";

/// Credentials were missing or rejected by the store.
pub fn is_authentication_error(error: &DriverError) -> bool {
    error.name == INVALID_SIGNATURE
        || error.name == UNRECOGNIZED_CLIENT
        || error.message.starts_with(MISSING_CREDENTIALS_PREFIX)
}

/// The item lacked a key attribute or carried one of the wrong type.
pub fn is_invalid_key_error(error: &DriverError) -> bool {
    error.name == VALIDATION
        && (error.message.starts_with(MISSING_KEY_PREFIX)
            || error.message.starts_with(KEY_TYPE_MISMATCH_PREFIX))
}

/// The table already exists or is still being created.
pub fn is_table_exists_error(error: &DriverError) -> bool {
    error.name == RESOURCE_IN_USE
        && (error.message.starts_with(TABLE_EXISTS_PREFIX)
            || error.message.starts_with(TABLE_IN_USE_PREFIX))
}

/// The named table does not exist.
pub fn is_missing_table_error(error: &DriverError) -> bool {
    error.name == RESOURCE_NOT_FOUND
}

/// Maps a driver error raised while operating on `table` to a [`StorageError`].
pub fn classify(error: DriverError, table: &str) -> StorageError {
    if is_authentication_error(&error) {
        StorageError::Authentication
    } else if is_invalid_key_error(&error) {
        StorageError::InvalidKey
    } else if is_table_exists_error(&error) {
        StorageError::table_exists(table)
    } else if is_missing_table_error(&error) {
        StorageError::missing_table(table)
    } else {
        StorageError::Unclassified(error)
    }
}
