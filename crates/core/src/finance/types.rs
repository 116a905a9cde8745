use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A user's link to a financial institution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub name: String,
    /// Access token issued by the aggregation service.
    pub token: String,
    pub user: String,
    #[serde(with = "crate::timestamp")]
    pub created_date: DateTime<Utc>,
    #[serde(with = "crate::timestamp")]
    pub modified_date: DateTime<Utc>,
}

/// One run of fetching transactions for a set of connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    pub user: String,
    pub connections: Vec<String>,
    #[serde(with = "crate::timestamp")]
    pub created_date: DateTime<Utc>,
    #[serde(with = "crate::timestamp")]
    pub modified_date: DateTime<Utc>,
    #[serde(default, with = "crate::timestamp::option")]
    pub finished_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TransactionUpdate {
    /// Returns true once the update has run to completion.
    pub fn is_finished(&self) -> bool {
        self.finished_date.is_some()
    }
}

/// Whether a transaction has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Posted,
}

impl TransactionStatus {
    pub fn from_pending(pending: bool) -> Self {
        if pending {
            TransactionStatus::Pending
        } else {
            TransactionStatus::Posted
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Pending => f.write_str("pending"),
            TransactionStatus::Posted => f.write_str("posted"),
        }
    }
}

/// A stored transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub user: String,
    pub account_id: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub currency: String,
    pub merchant: String,
    pub name: String,
    pub status: TransactionStatus,
    pub transaction_id: String,
    #[serde(rename = "status#transactionDate")]
    pub status_date: String,
    #[serde(with = "crate::timestamp")]
    pub created_date: DateTime<Utc>,
    #[serde(with = "crate::timestamp")]
    pub modified_date: DateTime<Utc>,
    /// The aggregator's record, untouched.
    pub raw: Map<String, Value>,
}

/// Request payload for storing a new connection.
///
/// Fields not listed here are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateConnectionRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub token: String,
}

impl CreateConnectionRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            token: token.into(),
        }
    }
}

/// Request payload for starting a transaction update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTransactionUpdateRequest {
    #[serde(default)]
    pub connections: Vec<String>,
}

impl CreateTransactionUpdateRequest {
    pub fn new<I, S>(connections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            connections: connections.into_iter().map(Into::into).collect(),
        }
    }
}
