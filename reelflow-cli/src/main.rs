//! Reelflow CLI
//!
//! Command-line interface for watching generation jobs and driving the
//! wizard state kept in the local session store.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "reelflow")]
#[command(about = "Reelflow video studio CLI", long_about = None)]
struct Cli {
    /// Backend URL
    #[arg(long, env = "REELFLOW_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    /// User token sent as a bearer credential (defaults to the stored token)
    #[arg(long, env = "REELFLOW_TOKEN")]
    token: Option<String>,

    /// Session store file
    #[arg(long, env = "REELFLOW_STORE", default_value = ".reelflow/session.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelflow_cli=info,reelflow_flow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.api_url, cli.token, cli.store)?;

    handle_command(cli.command, &config).await
}
