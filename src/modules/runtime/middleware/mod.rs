//! Middleware installed in front of the GraphQL endpoint

pub mod body;
pub mod cors;
pub mod scoped;
pub mod upload;

pub use body::{parse_body, parse_urlencoded, ParsedBody};
pub use cors::cors_layer;
pub use scoped::{Scoped, ScopedLayer};
pub use upload::{process_request, upload_middleware, UploadState};
