//! Run command implementation

use super::console::{dispatch, Flow, OperatorCommand, HELP};
use super::open_store;
use crate::cache::ShadowSlot;
use crate::config::Config;
use crate::controller::SamplingController;
use crate::quote::P2pClient;
use clap::Args;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Arm recording immediately
    #[arg(short, long)]
    pub record: bool,

    /// Override the configured transaction amount
    #[arg(short, long)]
    pub amount: Option<Decimal>,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut controller_config = config.controller_config();
        if let Some(amount) = self.amount {
            controller_config.filter.set_trans_amount(amount)?;
        }

        let source = Arc::new(P2pClient::with_config(config.p2p_config())?);
        let store = open_store(&config.store)?;
        let shadow = match &config.cache.shadow_path {
            Some(path) => ShadowSlot::new(path),
            None => ShadowSlot::disabled(),
        };

        let controller = SamplingController::new(controller_config, source, store, shadow);
        controller.start().await;

        if self.record {
            controller.start_recording().await;
        }

        println!("{}", HELP);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        loop {
            tokio::select! {
                line = lines.next_line(), if stdin_open => {
                    match line {
                        Ok(Some(line)) => {
                            if line.trim().is_empty() {
                                continue;
                            }
                            match line.parse::<OperatorCommand>() {
                                Ok(command) => {
                                    let (flow, output) = dispatch(&controller, command).await;
                                    println!("{}", output);
                                    if flow == Flow::Quit {
                                        break;
                                    }
                                }
                                Err(e) => println!("{}", e),
                            }
                        }
                        Ok(None) => {
                            tracing::info!("Stdin closed, running until interrupted");
                            stdin_open = false;
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to read stdin");
                            stdin_open = false;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted");
                    break;
                }
            }
        }

        controller.shutdown();
        tracing::info!("Controller stopped");
        Ok(())
    }
}
