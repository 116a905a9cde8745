//! Command handlers.
//!
//! Each handler builds the domain model for the requested user, runs one
//! operation and returns the result as JSON for printing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Subcommand;
use finsync_core::finance::{
    table_name, Connections, CreateConnectionRequest, CreateTransactionUpdateRequest,
    TransactionUpdates, Transactions,
};
use finsync_core::storage::{
    fault_category, FaultCategory, InputError, KeySchema, Storage, StorageError,
};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage a user's bank connections
    Connections {
        #[command(subcommand)]
        command: ConnectionsCommand,
    },
    /// Track transaction update runs
    Updates {
        #[command(subcommand)]
        command: UpdatesCommand,
    },
    /// Import and list transactions
    Transactions {
        #[command(subcommand)]
        command: TransactionsCommand,
    },
    /// Create tables ahead of the first write
    Tables {
        #[command(subcommand)]
        command: TablesCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConnectionsCommand {
    /// Store a new connection
    Create {
        #[arg(long)]
        user: String,
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        token: String,
    },
    /// List the user's connections
    List {
        #[arg(long)]
        user: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum UpdatesCommand {
    /// Start an update over one or more connections
    Create {
        #[arg(long)]
        user: String,
        /// Connection id, may be repeated
        #[arg(long = "connection", required = true)]
        connections: Vec<String>,
    },
    /// Show the most recent update
    Latest {
        #[arg(long)]
        user: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TransactionsCommand {
    /// Import aggregator transactions from a JSON file
    Import {
        #[arg(long)]
        user: String,
        /// A JSON array of transactions, or an object with a `transactions` array
        #[arg(long)]
        file: PathBuf,
    },
    /// List the user's transactions
    List {
        #[arg(long)]
        user: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TablesCommand {
    /// Create `<environment>-<entity>` and wait until it is active
    Create {
        #[arg(long)]
        entity: String,
        /// Key schema, e.g. `{"partition": {"name": "user", "type": "string"}}`
        #[arg(long)]
        key: String,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("{path} does not contain a list of transactions")]
    NotAList { path: String },
}

/// Runs `command` against `storage` and returns the printable result.
pub async fn run(command: Command, environment: &str, storage: Arc<dyn Storage>) -> Result<Value> {
    let value = match command {
        Command::Connections { command } => match command {
            ConnectionsCommand::Create {
                user,
                id,
                name,
                token,
            } => {
                let connections = Connections::new(environment, storage, &user)?;
                let created = connections
                    .create(CreateConnectionRequest::new(id, name, token))
                    .await?;
                serde_json::to_value(created)?
            }
            ConnectionsCommand::List { user } => {
                let connections = Connections::new(environment, storage, &user)?;
                serde_json::to_value(connections.list().await?)?
            }
        },
        Command::Updates { command } => match command {
            UpdatesCommand::Create { user, connections } => {
                let updates = TransactionUpdates::new(environment, storage, &user)?;
                let created = updates
                    .create(CreateTransactionUpdateRequest::new(connections))
                    .await?;
                serde_json::to_value(created)?
            }
            UpdatesCommand::Latest { user } => {
                let updates = TransactionUpdates::new(environment, storage, &user)?;
                serde_json::to_value(updates.get_latest().await?)?
            }
        },
        Command::Transactions { command } => match command {
            TransactionsCommand::Import { user, file } => {
                let records = read_transactions(&file).await?;
                let transactions = Transactions::new(environment, storage, &user)?;
                let created = transactions.create(&records).await?;
                tracing::info!(count = created.len(), file = %file.display(), "imported transactions");
                serde_json::to_value(created)?
            }
            TransactionsCommand::List { user } => {
                let transactions = Transactions::new(environment, storage, &user)?;
                serde_json::to_value(transactions.list().await?)?
            }
        },
        Command::Tables { command } => match command {
            TablesCommand::Create { entity, key } => {
                if entity.is_empty() {
                    return Err(InputError::new("entity").into());
                }
                let descriptor: Value =
                    serde_json::from_str(&key).context("--key is not valid JSON")?;
                let key = KeySchema::from_descriptor(&descriptor)?;
                let table = table_name(environment, &entity);
                storage.create_table(&key, &table).await?;
                tracing::info!(table = %table, "table ready");
                json!({ "table": table, "key": serde_json::to_value(&key)? })
            }
        },
    };
    Ok(value)
}

/// Fault category of a failed command, when the failure came from the
/// models or the store.
pub fn failure_category(err: &anyhow::Error) -> Option<FaultCategory> {
    if let Some(storage_error) = err.downcast_ref::<StorageError>() {
        return Some(fault_category(storage_error));
    }
    err.downcast_ref::<InputError>().map(|_| FaultCategory::PermanentInput)
}

async fn read_transactions(path: &Path) -> Result<Vec<Value>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let document: Value = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(transaction_records(document, path)?)
}

fn transaction_records(document: Value, path: &Path) -> Result<Vec<Value>, ImportError> {
    match document {
        Value::Array(records) => Ok(records),
        Value::Object(mut object) => match object.remove("transactions") {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(ImportError::NotAList {
                path: path.display().to_string(),
            }),
        },
        _ => Err(ImportError::NotAList {
            path: path.display().to_string(),
        }),
    }
}
