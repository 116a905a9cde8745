use std::{env, time::Duration};

use finsync_core::storage::ProvisioningConfig;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Deployment environment, prefixed to every table name (default: "dev")
    pub environment: String,
    /// Access key id for the store. Falls back to the default credential chain when unset.
    pub storage_id: Option<String>,
    /// Secret access key for the store.
    pub storage_secret: Option<String>,
    /// Store region (default: "us-east-1")
    pub storage_region: String,
    /// Endpoint override for a local store.
    pub endpoint_url: Option<String>,
    /// First delay between table status checks in milliseconds (default: 500)
    pub table_poll_interval_ms: u64,
    /// Cap for the doubling delay in milliseconds (default: 5,000)
    pub table_poll_max_interval_ms: u64,
    /// How long to wait for a new table to become active in seconds (default: 60)
    pub table_active_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ENVIRONMENT` - Table name prefix (default: "dev")
    /// - `STORAGE_ID` - Access key id (optional)
    /// - `STORAGE_SECRET` - Secret access key (optional)
    /// - `STORAGE_REGION` - Store region (default: "us-east-1")
    /// - `AWS_ENDPOINT_URL` - Endpoint override (optional)
    /// - `TABLE_POLL_INTERVAL_MS` - First poll delay (default: 500)
    /// - `TABLE_POLL_MAX_INTERVAL_MS` - Poll delay cap (default: 5,000)
    /// - `TABLE_ACTIVE_TIMEOUT_SECS` - Table activation timeout (default: 60)
    pub fn from_env() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()),
            storage_id: non_empty_var("STORAGE_ID"),
            storage_secret: non_empty_var("STORAGE_SECRET"),
            storage_region: env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            endpoint_url: non_empty_var("AWS_ENDPOINT_URL"),
            table_poll_interval_ms: env::var("TABLE_POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            table_poll_max_interval_ms: env::var("TABLE_POLL_MAX_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5_000),
            table_active_timeout_secs: env::var("TABLE_ACTIVE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }

    /// Static credentials, when both halves are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.storage_id, &self.storage_secret) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }

    /// Table provisioning settings for the storage client.
    pub fn provisioning(&self) -> ProvisioningConfig {
        ProvisioningConfig {
            poll_interval: Duration::from_millis(self.table_poll_interval_ms),
            max_poll_interval: Duration::from_millis(self.table_poll_max_interval_ms),
            timeout: Duration::from_secs(self.table_active_timeout_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}
