//! Executor options passed to the query processor

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};
use trellis_types::FormattedError;

use super::Environment;
use crate::error::TrellisError;

/// Hook applied to every error before it is sent to a client
pub type ErrorFormatter = Arc<dyn Fn(FormattedError) -> FormattedError + Send + Sync>;

/// Settings handed to the query processor for one request
#[derive(Clone)]
pub struct GraphQLOptions {
    /// Include exception details in error extensions
    pub debug: bool,

    /// Allow introspection queries
    pub introspection: bool,

    /// Request context made available to resolvers
    pub context: Option<Value>,

    /// Root value made available to top-level resolvers
    pub root_value: Option<Value>,

    /// Error formatting hook
    pub format_error: Option<ErrorFormatter>,
}

impl GraphQLOptions {
    /// Options with defaults for the given environment
    ///
    /// Debug output and introspection are on everywhere except production.
    pub fn for_environment(env: Environment) -> Self {
        let dev = !env.is_production();
        Self {
            debug: dev,
            introspection: dev,
            context: None,
            root_value: None,
            format_error: None,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_introspection(mut self, introspection: bool) -> Self {
        self.introspection = introspection;
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_root_value(mut self, root_value: Value) -> Self {
        self.root_value = Some(root_value);
        self
    }

    pub fn with_format_error<F>(mut self, formatter: F) -> Self
    where
        F: Fn(FormattedError) -> FormattedError + Send + Sync + 'static,
    {
        self.format_error = Some(Arc::new(formatter));
        self
    }

    /// Apply debug stripping and the formatting hook to an error
    pub fn format(&self, mut error: FormattedError) -> FormattedError {
        if !self.debug {
            if let Some(ext) = error.extensions.as_mut() {
                ext.remove("exception");
                if ext.is_empty() {
                    error.extensions = None;
                }
            }
        }
        match &self.format_error {
            Some(formatter) => formatter(error),
            None => error,
        }
    }

    /// Convert an arbitrary error into a formatted GraphQL error
    ///
    /// Exposed errors keep their message; anything else is reported as an
    /// internal server error, with the full message kept in
    /// `extensions.exception` for debug builds.
    pub fn format_trellis_error(&self, err: &TrellisError) -> FormattedError {
        let code = match err.status_code() {
            400 | 413 => "BAD_USER_INPUT",
            _ => "INTERNAL_SERVER_ERROR",
        };
        let formatted = FormattedError::new(err.to_string())
            .with_extension("code", json!(code))
            .with_extension("exception", json!({ "stacktrace": [err.to_string()] }));
        self.format(formatted)
    }
}

impl Default for GraphQLOptions {
    fn default() -> Self {
        Self::for_environment(Environment::from_env())
    }
}

impl fmt::Debug for GraphQLOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphQLOptions")
            .field("debug", &self.debug)
            .field("introspection", &self.introspection)
            .field("context", &self.context)
            .field("root_value", &self.root_value)
            .field("format_error", &self.format_error.is_some())
            .finish()
    }
}
