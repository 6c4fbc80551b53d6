//! The query processing contract
//!
//! Trellis does not execute GraphQL itself. The request handler hands every
//! operation to an [`HttpQueryProcessor`], which returns either a serialized
//! result with response headers or an error. [`SchemaProcessor`] implements
//! the contract on top of an `async-graphql` schema.

mod schema;

pub use schema::{RequestContext, SchemaProcessor};

use std::collections::BTreeMap;

use async_trait::async_trait;
use axum::http::{request::Parts, HeaderMap, Method, Uri};
use serde_json::Value;
use trellis_core::{GraphQLOptions, TrellisError};
use trellis_types::UploadedFiles;

/// Transport-independent view of the incoming request
#[derive(Debug, Clone)]
pub struct NormalizedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl NormalizedRequest {
    pub fn from_parts(parts: &Parts) -> Self {
        Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
        }
    }
}

/// Everything the processor needs to run one HTTP GraphQL request
#[derive(Debug, Clone)]
pub struct HttpQueryRequest {
    pub method: Method,
    /// Options resolved for this request
    pub options: GraphQLOptions,
    /// Parsed body for POST, parsed query string otherwise; `None` when no
    /// body parser ran
    pub query: Option<Value>,
    pub request: NormalizedRequest,
    /// Files received with a multipart request
    pub uploads: Option<UploadedFiles>,
}

/// Successful processor output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpQueryResponse {
    /// Serialized GraphQL response
    pub graphql_response: String,
    /// Headers to set on the HTTP response
    pub headers: BTreeMap<String, String>,
}

/// Executes GraphQL operations extracted from HTTP requests
///
/// Return [`TrellisError::HttpQuery`] for protocol errors that should be
/// answered directly (bad payload, wrong method); any other error is passed
/// on to the framework.
#[async_trait]
pub trait HttpQueryProcessor: Send + Sync {
    async fn run_http_query(
        &self,
        request: HttpQueryRequest,
    ) -> Result<HttpQueryResponse, TrellisError>;
}
