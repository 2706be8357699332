//! Akin - unified CLI
//!
//! Line game, terminal UI and HTTP forwarding service.

#![warn(missing_docs)]

mod cli;
mod line;
mod tui;

use akin::{AkinConfig, AppState, Backend, HttpTransportFactory};
use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command, GameArgs};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play(args) => {
            init_stderr_tracing("warn");
            let config = AkinConfig::load_or_default(&cli.config)?;
            run_line(config, args).await
        }
        Command::Tui(args) => {
            let config = AkinConfig::load_or_default(&cli.config)?;
            let backend = Backend::from_config(&config, args.engine_url.clone());
            tui::run_tui(backend, args).await
        }
        Command::Serve { host, port } => {
            init_stderr_tracing("info");
            let config = AkinConfig::load_or_default(&cli.config)?.with_server_overrides(host, port);
            run_server(config).await
        }
    }
}

/// Play one game on the command line
async fn run_line(config: AkinConfig, args: GameArgs) -> Result<()> {
    let backend = Backend::from_config(&config, args.engine_url.clone());
    line::run(&backend, &args).await
}

/// Run the HTTP forwarding service
#[instrument(skip_all, fields(host = %config.server().host(), port = *config.server().port()))]
async fn run_server(config: AkinConfig) -> Result<()> {
    info!("Starting akin forwarding service");
    let transports = HttpTransportFactory::new(config.remote().clone(), config.player().clone());
    akin::serve(config.server().host(), *config.server().port(), AppState::new(transports)).await
}

fn init_stderr_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
