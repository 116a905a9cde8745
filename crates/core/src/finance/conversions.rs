//! Conversions between finance records and storage items.
//!
//! Records are encoded into generic items only at the storage boundary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::storage::{InputError, Item, StorageError, StorageResult};

use super::tables::transaction_sort_value;
use super::types::{Transaction, TransactionStatus};

/// Encodes a record as a storage item.
pub fn to_item<T: Serialize>(record: &T) -> StorageResult<Item> {
    match serde_json::to_value(record) {
        Ok(Value::Object(item)) => Ok(item),
        Ok(other) => Err(StorageError::Serialization(format!(
            "expected an object, got {other}"
        ))),
        Err(e) => Err(StorageError::Serialization(e.to_string())),
    }
}

/// Decodes a storage item into a record.
pub fn from_item<T: DeserializeOwned>(item: Item) -> StorageResult<T> {
    serde_json::from_value(Value::Object(item))
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Builds a [`Transaction`] from an aggregator record.
///
/// Required fields are checked in a fixed order and the first missing or
/// mistyped one is reported, nested under `parent`.
pub fn raw_to_transaction(
    raw: &Value,
    user: &str,
    now: DateTime<Utc>,
    parent: &str,
) -> Result<Transaction, InputError> {
    let record = raw
        .as_object()
        .ok_or_else(|| InputError::new(parent.to_string()))?;
    let missing = |field: &str| InputError::nested(field, parent);

    let account_id = get_str(record, "account_id").ok_or_else(|| missing("account_id"))?;
    let amount = record
        .get("amount")
        .and_then(Value::as_f64)
        .ok_or_else(|| missing("amount"))?;
    let date = get_str(record, "date")
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .ok_or_else(|| missing("date"))?;
    let currency =
        get_str(record, "iso_currency_code").ok_or_else(|| missing("iso_currency_code"))?;
    let merchant = get_str(record, "merchant_name").ok_or_else(|| missing("merchant_name"))?;
    let name = get_str(record, "name").ok_or_else(|| missing("name"))?;
    let pending = record
        .get("pending")
        .and_then(Value::as_bool)
        .ok_or_else(|| missing("pending"))?;
    let transaction_id =
        get_str(record, "transaction_id").ok_or_else(|| missing("transaction_id"))?;

    let status = TransactionStatus::from_pending(pending);
    Ok(Transaction {
        user: user.to_string(),
        account_id: account_id.to_string(),
        amount,
        date,
        currency: currency.to_string(),
        merchant: merchant.to_string(),
        name: name.to_string(),
        status,
        transaction_id: transaction_id.to_string(),
        status_date: transaction_sort_value(status, date, transaction_id),
        created_date: now,
        modified_date: now,
        raw: record.clone(),
    })
}

fn get_str<'a>(record: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
