//! Trellis CLI
//!
//! This crate provides the command-line interface for Trellis including:
//! - run: Serve the bundled demo schema through the GraphQL middleware
//! - init: Write a starter configuration file
//! - completion: Generate shell completions (hidden)

pub mod commands;
pub mod schema;

pub use commands::{Cli, Commands};
