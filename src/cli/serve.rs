//! Serve command implementation

use super::open_store;
use crate::config::{Config, StoreBackend};
use crate::store::StoreServer;
use clap::Args;
use std::net::SocketAddr;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on (defaults to `store.listen_addr`)
    #[arg(short, long)]
    pub listen: Option<SocketAddr>,

    /// Backing store (defaults to `store.backend`; must not be http)
    #[arg(short, long, value_enum)]
    pub backend: Option<StoreBackend>,
}

impl ServeArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut store_config = config.store.clone();
        if let Some(backend) = self.backend {
            store_config.backend = backend;
        }
        if store_config.backend == StoreBackend::Http {
            anyhow::bail!("The store server needs a local backend (jsonl or memory), not http");
        }

        let mut server_config = config.store_server_config();
        if let Some(listen) = self.listen {
            server_config.listen_addr = listen;
        }

        let store = open_store(&store_config)?;
        let server = StoreServer::bind(server_config, store).await?;
        tracing::debug!(backend = ?store_config.backend, "Store server bound");

        tokio::select! {
            result = server.serve() => result,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                Ok(())
            }
        }
    }
}
