//! axum middleware and server runtime for Trellis
//!
//! This crate mounts a GraphQL endpoint on an axum [`Router`](axum::Router):
//! health probe, CORS, body and multipart parsing, the explorer page and the
//! request handler that drives an [`HttpQueryProcessor`].

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod negotiate;
pub mod processor;
pub mod server;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{ErrorReport, ErrorResponse};
pub use handlers::{
    render_playground_page, GraphQLHandler, HealthCheckFn, OptionsSource,
    PlaygroundRenderOptions,
};
pub use middleware::{ParsedBody, ScopedLayer};
pub use processor::{
    HttpQueryProcessor, HttpQueryRequest, HttpQueryResponse, NormalizedRequest, RequestContext,
    SchemaProcessor,
};
pub use server::{GraphQLServer, Runtime, ServerRegistration};
