//! Pure functions for mapping storage errors to client-facing faults.
//!
//! Callers at the API boundary use these to tell apart faults that go away
//! once a table finishes provisioning, faults caused by the request itself,
//! and credential problems between the service and the store.

use super::StorageError;

/// Broad class of a storage failure as seen by an API client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCategory {
    /// The request itself is malformed; retrying will not help.
    PermanentInput,
    /// A table is missing or still being created; retry later.
    RetryableProvisioning,
    /// The service's store credentials were rejected.
    Authentication,
    /// Anything else.
    Internal,
}

/// Maps a [`StorageError`] to its [`FaultCategory`].
pub fn fault_category(error: &StorageError) -> FaultCategory {
    match error {
        StorageError::Input(_) | StorageError::InvalidKey => FaultCategory::PermanentInput,
        StorageError::MissingTable { .. }
        | StorageError::TableExists { .. }
        | StorageError::ProvisioningTimeout { .. } => FaultCategory::RetryableProvisioning,
        StorageError::Authentication => FaultCategory::Authentication,
        StorageError::Serialization(_) | StorageError::Unclassified(_) => FaultCategory::Internal,
    }
}

/// Maps a [`StorageError`] to an HTTP status code.
///
/// - `PermanentInput` -> 400 (Bad Request)
/// - `RetryableProvisioning` -> 503 (Service Unavailable)
/// - `Authentication` -> 502 (Bad Gateway)
/// - `Internal` -> 500 (Internal Server Error)
///
/// # Examples
///
/// ```
/// use finsync_core::storage::{storage_error_to_status_code, StorageError};
///
/// let error = StorageError::missing_table("prod-connections");
/// assert_eq!(storage_error_to_status_code(&error), 503);
/// ```
pub fn storage_error_to_status_code(error: &StorageError) -> u16 {
    match fault_category(error) {
        FaultCategory::PermanentInput => 400,
        FaultCategory::RetryableProvisioning => 503,
        FaultCategory::Authentication => 502,
        FaultCategory::Internal => 500,
    }
}
