//! Core domain logic for Trellis
//!
//! This crate contains the configuration model (server, CORS, body parser,
//! uploads, explorer page), the GraphQL executor options and the error types
//! shared by every Trellis crate.

pub mod domain;
pub mod error;

pub use domain::*;
pub use error::{HttpQueryError, Result, TrellisError};
