//! Error types for Trellis

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// An error raised while processing a GraphQL HTTP request that maps
/// directly onto an HTTP response
///
/// This is the only error the request handler answers locally; every other
/// [`TrellisError`] is passed on to the host framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpQueryError {
    /// HTTP status code to respond with
    pub status: u16,
    /// Response body
    pub message: String,
    /// Whether `message` is a serialized GraphQL error document
    pub is_graphql_error: bool,
    /// Headers to set on the response
    pub headers: BTreeMap<String, String>,
}

impl HttpQueryError {
    /// Create an error with a plain-text message
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            is_graphql_error: false,
            headers: BTreeMap::new(),
        }
    }

    /// Create an error whose message is a JSON GraphQL error document
    pub fn graphql(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            message: body.into(),
            is_graphql_error: true,
            headers: BTreeMap::new(),
        }
        .with_header("Content-Type", "application/json")
    }

    /// Add a response header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl fmt::Display for HttpQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Main error type for Trellis operations
#[derive(Error, Debug)]
pub enum TrellisError {
    /// Missing or malformed configuration, raised at setup time
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Expected protocol error produced by the query processor
    #[error("{0}")]
    HttpQuery(HttpQueryError),

    /// Multipart upload parsing error
    #[error("Upload error: {message}")]
    Upload {
        status: u16,
        expose: bool,
        message: String,
    },

    /// Request body could not be read or decoded
    #[error("Body parse error: {message}")]
    BodyParse { status: u16, message: String },

    /// Query execution error outside the HTTP protocol
    #[error("Query execution failed: {0}")]
    Execution(String),

    /// HTTP server error
    #[error("Server error: {0}")]
    Server(String),

    /// File system error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Environment variable not found
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TrellisError {
    /// Shorthand for an [`HttpQueryError`] with a plain-text message
    pub fn http_query(status: u16, message: impl Into<String>) -> Self {
        TrellisError::HttpQuery(HttpQueryError::new(status, message))
    }

    /// Shorthand for an upload error whose status may be shown to clients
    pub fn upload(status: u16, message: impl Into<String>) -> Self {
        TrellisError::Upload {
            status,
            expose: true,
            message: message.into(),
        }
    }

    /// Shorthand for a body parse error
    pub fn body_parse(status: u16, message: impl Into<String>) -> Self {
        TrellisError::BodyParse {
            status,
            message: message.into(),
        }
    }

    /// Returns the HTTP query error if this is the recognized protocol error
    pub fn as_http_query(&self) -> Option<&HttpQueryError> {
        match self {
            TrellisError::HttpQuery(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true if the error carries a status that may be sent to clients
    pub fn is_exposed(&self) -> bool {
        match self {
            TrellisError::HttpQuery(_) | TrellisError::BodyParse { .. } => true,
            TrellisError::Upload { expose, .. } => *expose,
            _ => false,
        }
    }

    /// Returns true if this error should be logged at error level
    pub fn is_error(&self) -> bool {
        !self.is_exposed()
    }

    /// Returns the appropriate HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            TrellisError::HttpQuery(err) => err.status,
            TrellisError::Upload { status, .. } | TrellisError::BodyParse { status, .. } => {
                *status
            }
            _ => 500,
        }
    }

    /// Message safe to send to clients
    pub fn sanitized_message(&self) -> String {
        match self {
            TrellisError::HttpQuery(err) => err.message.clone(),
            TrellisError::BodyParse { message, .. } => message.clone(),
            TrellisError::Upload {
                expose: true,
                message,
                ..
            } => message.clone(),
            _ => "Internal Server Error".to_string(),
        }
    }
}

impl From<HttpQueryError> for TrellisError {
    fn from(err: HttpQueryError) -> Self {
        TrellisError::HttpQuery(err)
    }
}

/// Result type alias using TrellisError
pub type Result<T> = std::result::Result<T, TrellisError>;
