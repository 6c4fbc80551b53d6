//! Trellis CLI
//!
//! Command-line interface for the Trellis GraphQL middleware.

use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use trellis_cli::{Cli, Commands};
use trellis_core::TrellisError;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), TrellisError> {
    let cli = Cli::parse();
    let config_path = cli.config_path().to_string();

    // Initialize logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    // Execute command
    match cli.command {
        Commands::Run(cmd) => {
            cmd.execute(&config_path).await?;
        }
        Commands::Init(cmd) => {
            cmd.execute()?;
        }
        Commands::Completion(cmd) => {
            cmd.execute();
        }
    }

    Ok(())
}
