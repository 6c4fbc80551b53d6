//! Type definitions for Trellis
//!
//! This crate contains the wire-level types shared across the Trellis
//! workspace: GraphQL payloads and formatted errors, health probe bodies,
//! and uploaded file descriptors.

pub mod graphql;
pub mod health;
pub mod upload;

pub use graphql::{FormattedError, GraphQLPayload, Location};
pub use health::{HealthResponse, HealthStatus, HEALTH_CONTENT_TYPE};
pub use upload::{UploadDescriptor, UploadedFile, UploadedFiles};
