//! Table names and key schemas for the finance entities.
//!
//! Pure functions; one table per entity per environment, named
//! `<environment>-<entity>`.

use chrono::NaiveDate;

use crate::storage::{KeyAttribute, KeySchema};

use super::types::TransactionStatus;

// ============================================================================
// Entity names
// ============================================================================

pub const CONNECTIONS: &str = "connections";
pub const TRANSACTION_UPDATES: &str = "transaction-updates";
pub const TRANSACTIONS: &str = "transactions";

// ============================================================================
// Key attribute names
// ============================================================================

pub const USER_KEY: &str = "user";
pub const TOKEN_KEY: &str = "token";
pub const CREATED_DATE_KEY: &str = "createdDate";
pub const STATUS_DATE_KEY: &str = "status#transactionDate";

/// Table name for `entity` in `environment`.
///
/// Pattern: `<environment>-<entity>`
pub fn table_name(environment: &str, entity: &str) -> String {
    format!("{environment}-{entity}")
}

/// Connections: partition `user`, sort `token`.
pub fn connections_key() -> KeySchema {
    KeySchema::new(KeyAttribute::string(USER_KEY)).with_sort(KeyAttribute::string(TOKEN_KEY))
}

/// Transaction updates: partition `user`, sort `createdDate`.
pub fn transaction_updates_key() -> KeySchema {
    KeySchema::new(KeyAttribute::string(USER_KEY))
        .with_sort(KeyAttribute::string(CREATED_DATE_KEY))
}

/// Transactions: partition `user`, sort `status#transactionDate`.
pub fn transactions_key() -> KeySchema {
    KeySchema::new(KeyAttribute::string(USER_KEY))
        .with_sort(KeyAttribute::string(STATUS_DATE_KEY))
}

/// Sort value for a transaction.
///
/// Pattern: `<status>#<YYYY-MM-DD>#<transaction_id>`
///
/// Status then date keeps lexicographic order meaningful; the id suffix keeps
/// transactions on the same day from overwriting each other.
pub fn transaction_sort_value(
    status: TransactionStatus,
    date: NaiveDate,
    transaction_id: &str,
) -> String {
    format!("{status}#{}#{transaction_id}", date.format("%Y-%m-%d"))
}
