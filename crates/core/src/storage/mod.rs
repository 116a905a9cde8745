mod classify;
mod client;
mod codec;
mod error;
mod http_mapping;
mod keys;
mod query;
mod traits;

pub use classify::{
    classify, is_authentication_error, is_invalid_key_error, is_missing_table_error,
    is_table_exists_error, DriverError, INVALID_SIGNATURE, KEY_TYPE_MISMATCH_PREFIX,
    MISSING_CREDENTIALS_PREFIX, MISSING_KEY_PREFIX, RESOURCE_IN_USE, RESOURCE_NOT_FOUND,
    TABLE_EXISTS_PREFIX, TABLE_IN_USE_PREFIX, UNRECOGNIZED_CLIENT, VALIDATION,
};
pub use client::{ProvisioningConfig, StorageClient, MIN_POLL_INTERVAL};
pub use codec::{
    decode, decode_item, encode, encode_item, Item, TAG_BINARY, TAG_BOOLEAN, TAG_LIST, TAG_MAP,
    TAG_NULL, TAG_NUMBER, TAG_STRING,
};
pub use error::{InputError, StorageError, StorageResult};
pub use http_mapping::{fault_category, storage_error_to_status_code, FaultCategory};
pub use keys::{
    AttributeDefinition, BillingMode, KeyAttribute, KeySchema, KeySchemaElement, KeyType,
    ScalarType, TableDefinition,
};
pub use query::{Query, QueryRequest};
pub use traits::{Storage, StoreDriver, TableStatus};
