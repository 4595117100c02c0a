//! History and purge commands

use super::console::render_history;
use super::open_store;
use crate::config::Config;
use clap::Args;

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Print samples as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl HistoryArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let store = open_store(&config.store)?;
        let samples = store.list_all().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&samples)?);
        } else {
            println!("{}", render_history(&samples));
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct PurgeArgs {
    /// Confirm deletion of every stored sample
    #[arg(long)]
    pub yes: bool,
}

impl PurgeArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        if !self.yes {
            anyhow::bail!("Refusing to delete all samples without --yes");
        }

        let store = open_store(&config.store)?;
        let deleted = store.delete_all().await?;
        tracing::info!(deleted, "Purged sample store");
        println!("Deleted {} document(s).", deleted);
        Ok(())
    }
}
