mod commands;
mod config;
mod storage;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{commands::Command, config::Config, storage::Backend};

/// finsync - Keep track of bank connections and transactions
#[derive(Parser, Debug)]
#[command(name = "finsync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Environment prefixed to every table name
    #[arg(long, short, env = "ENVIRONMENT")]
    environment: Option<String>,

    /// Store driver to use
    #[arg(long, short, value_enum, default_value = "dynamodb", env = "STORAGE_BACKEND")]
    backend: Backend,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finsync=info,finsync_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::from_env();
    if let Some(environment) = cli.environment {
        config.environment = environment;
    }

    tracing::debug!(environment = %config.environment, backend = ?cli.backend, "starting");

    let storage = storage::connect(&config, cli.backend).await?;
    let output = match commands::run(cli.command, &config.environment, storage).await {
        Ok(output) => output,
        Err(err) => {
            if let Some(category) = commands::failure_category(&err) {
                tracing::error!(?category, "{err}");
            }
            return Err(err);
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
