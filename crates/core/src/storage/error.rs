use thiserror::Error;

use super::classify::DriverError;

/// A caller-supplied argument was missing or structurally invalid.
///
/// Raised before any request reaches the store and never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Value '{field}'{} was missing or invalid", located_in(.parent))]
pub struct InputError {
    pub field: String,
    pub parent: Option<String>,
}

impl InputError {
    /// Creates an error for a top-level field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            parent: None,
        }
    }

    /// Creates an error for a field nested inside `parent`.
    pub fn nested(field: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            parent: Some(parent.into()),
        }
    }
}

fn located_in(parent: &Option<String>) -> String {
    parent
        .as_ref()
        .map(|parent| format!(" in '{parent}'"))
        .unwrap_or_default()
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("Failed to authenticate with storage system")]
    Authentication,
    #[error("Item had invalid key")]
    InvalidKey,
    #[error("Table '{table}' does not exist")]
    MissingTable { table: String },
    #[error("Table '{table}' already exists")]
    TableExists { table: String },
    #[error("Table '{table}' did not become active in time")]
    ProvisioningTimeout { table: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error(transparent)]
    Unclassified(DriverError),
}

impl StorageError {
    pub fn missing_table(table: impl Into<String>) -> Self {
        Self::MissingTable {
            table: table.into(),
        }
    }

    pub fn table_exists(table: impl Into<String>) -> Self {
        Self::TableExists {
            table: table.into(),
        }
    }

    /// Returns true when the named table has not been created yet.
    pub fn is_missing_table(&self) -> bool {
        matches!(self, Self::MissingTable { .. })
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
