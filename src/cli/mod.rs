//! CLI interface for p2p-recorder
//!
//! Provides subcommands for:
//! - `run`: Sample quotes and take operator commands from stdin
//! - `serve`: Host the sample store over HTTP
//! - `history`: Print recorded samples
//! - `purge`: Delete all recorded samples
//! - `config`: Show the effective configuration

mod console;
mod history;
mod run;
mod serve;

pub use console::{render_history, render_quotes, render_status, CommandError, OperatorCommand};
pub use history::{HistoryArgs, PurgeArgs};
pub use run::RunArgs;
pub use serve::ServeArgs;

use crate::config::{StoreBackend, StoreConfig};
use crate::store::{HttpStore, JsonlStore, MemoryStore, RecordStore};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "p2p-recorder")]
#[command(about = "Samples Binance P2P buy/sell quotes and records representative price pairs")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sample quotes and take operator commands from stdin
    Run(RunArgs),
    /// Host the sample store over HTTP
    Serve(ServeArgs),
    /// Print recorded samples
    History(HistoryArgs),
    /// Delete all recorded samples
    Purge(PurgeArgs),
    /// Show the effective configuration
    Config,
}

/// Open the configured sample store backend
pub fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match config.backend {
        StoreBackend::Http => Arc::new(HttpStore::new(
            config.url.clone(),
            Duration::from_secs(config.timeout_secs),
        )?),
        StoreBackend::Jsonl => Arc::new(JsonlStore::new(config.path.clone())),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };

    tracing::debug!(backend = ?config.backend, "Opened sample store");
    Ok(store)
}
