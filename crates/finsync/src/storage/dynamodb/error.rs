//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to the opaque `DriverError` the storage client
//! classifies. Service errors keep their error code and message; transport
//! and credential failures are rendered with their full source chain.

use std::error::Error as StdError;
use std::fmt::Debug;

use aws_sdk_dynamodb::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use finsync_core::storage::{DriverError, MISSING_CREDENTIALS_PREFIX};

/// Name used for failures that never reached the service.
pub const CLIENT_FAILURE: &str = "ClientFailure";

/// Name used for failures while building a request.
pub const REQUEST_BUILD_FAILURE: &str = "RequestBuildFailure";

/// Name used when a batch write leaves items unprocessed.
pub const UNPROCESSED_ITEMS: &str = "UnprocessedItems";

/// Map any SDK operation error to a `DriverError`.
pub fn map_sdk_error<E, R>(err: SdkError<E, R>) -> DriverError
where
    E: ProvideErrorMetadata + StdError + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    if let Some(service) = err.as_service_error() {
        return DriverError::new(
            service.code().unwrap_or(CLIENT_FAILURE),
            service.message().unwrap_or_default(),
        );
    }

    let rendered = DisplayErrorContext(&err).to_string();
    client_failure(&rendered)
}

/// Map a request builder error to a `DriverError`.
pub fn build_error(err: BuildError) -> DriverError {
    DriverError::new(REQUEST_BUILD_FAILURE, err.to_string())
}

fn client_failure(rendered: &str) -> DriverError {
    if rendered.to_ascii_lowercase().contains("credentials") {
        DriverError::new(
            CLIENT_FAILURE,
            format!("{MISSING_CREDENTIALS_PREFIX}: {rendered}"),
        )
    } else {
        DriverError::new(CLIENT_FAILURE, rendered)
    }
}
