use std::path::Path;

use catalog_scout::cli::output;
use catalog_scout::cli::{
    check, classify, discover, load_config, sweep, top, CheckCommand, Cli, Commands, Outcome,
};
use catalog_scout::config::{Config, LoggingConfig};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(e) => {
            output::error(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<Outcome> {
    match command {
        Commands::Classify(args) => {
            LoggingConfig::default().init();
            classify::execute(&args)
        }
        Commands::Check(CheckCommand::Config(args)) => check::execute_config(&args.config),
        Commands::Top(args) => {
            let config = setup(&args.config)?;
            top::execute(&config, &args, shutdown_token()).await
        }
        Commands::Discover(args) => {
            let config = setup(&args.config)?;
            discover::execute(&config, &args, shutdown_token()).await
        }
        Commands::Sweep(args) => {
            let config = setup(&args.discover.config)?;
            sweep::execute(&config, &args, shutdown_token()).await
        }
    }
}

fn setup(path: &Path) -> anyhow::Result<Config> {
    let config = load_config(path)?;
    config.init_logging();
    info!(api_url = %config.catalog.api_url, "catalog-scout starting");
    Ok(config)
}

/// Token cancelled on Ctrl-C.
fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received, cancelling");
            on_signal.cancel();
        }
    });
    token
}
