use clap::Parser;
use p2p_recorder::cli::{Cli, Commands};
use p2p_recorder::config::{Config, DEFAULT_CONFIG};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            Config::parse(DEFAULT_CONFIG)?
        }
    };

    p2p_recorder::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting quote sampler");
            args.execute(&config).await?;
        }
        Commands::Serve(args) => {
            tracing::info!("Starting sample store server");
            args.execute(&config).await?;
        }
        Commands::History(args) => args.execute(&config).await?,
        Commands::Purge(args) => args.execute(&config).await?,
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
