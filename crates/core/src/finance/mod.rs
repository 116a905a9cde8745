mod connections;
mod conversions;
mod tables;
#[cfg(test)]
mod testing;
mod transaction_updates;
mod transactions;
mod types;

pub use connections::Connections;
pub use conversions::{from_item, raw_to_transaction, to_item};
pub use tables::{
    connections_key, table_name, transaction_sort_value, transaction_updates_key,
    transactions_key, CONNECTIONS, CREATED_DATE_KEY, STATUS_DATE_KEY, TOKEN_KEY,
    TRANSACTIONS, TRANSACTION_UPDATES, USER_KEY,
};
pub use transaction_updates::TransactionUpdates;
pub use transactions::Transactions;
pub use types::{
    Connection, CreateConnectionRequest, CreateTransactionUpdateRequest, Transaction,
    TransactionStatus, TransactionUpdate,
};
