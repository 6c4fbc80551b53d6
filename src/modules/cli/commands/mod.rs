//! CLI commands

mod completion;
mod init;
mod run;

pub use completion::CompletionCommand;
pub use init::InitCommand;
pub use run::RunCommand;

use clap::{Parser, Subcommand};

/// Trellis - GraphQL server middleware for axum
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    ///
    /// This is a *global* option so it can be specified after subcommands,
    /// e.g. `trellis run -f trellis.yaml`.
    #[arg(
        short = 'f',
        long = "file",
        global = true,
        default_value = "trellis.yaml"
    )]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the demo schema through the GraphQL middleware
    Run(RunCommand),

    /// Write a starter configuration file
    Init(InitCommand),

    /// Generate shell completion scripts
    #[command(hide = true)]
    Completion(CompletionCommand),
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Effective configuration path
    pub fn config_path(&self) -> &str {
        &self.config
    }
}
