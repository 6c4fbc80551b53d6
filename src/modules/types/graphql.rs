//! GraphQL request and error shapes as they appear on the wire

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single GraphQL operation as sent by a client
///
/// For GET requests every field arrives as a string, so `variables` and
/// `extensions` may hold a JSON-encoded string rather than an object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLPayload {
    /// Query document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Variable values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,

    /// Operation to run when the document holds several
    #[serde(
        default,
        rename = "operationName",
        skip_serializing_if = "Option::is_none"
    )]
    pub operation_name: Option<String>,

    /// Protocol extensions (persisted queries and the like)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphQLPayload {
    /// Create a payload for a bare query document
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    /// Attach variables
    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Attach an operation name
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }
}

/// Source location of a GraphQL error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

/// A GraphQL error after formatting, ready for serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedError {
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<Location>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

impl FormattedError {
    /// Create an error carrying only a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: None,
            path: None,
            extensions: None,
        }
    }

    /// Set an extension entry, creating the extensions map if needed
    pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    /// The `extensions.code` entry, if any
    pub fn code(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_uses_camel_case_operation_name() {
        let payload: GraphQLPayload = serde_json::from_value(json!({
            "query": "query Q { a }",
            "operationName": "Q",
        }))
        .unwrap();
        assert_eq!(payload.operation_name.as_deref(), Some("Q"));
        assert!(payload.variables.is_none());
    }

    #[test]
    fn test_payload_skips_absent_fields() {
        let payload = GraphQLPayload::new("{ a }");
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"query":"{ a }"}"#);
    }

    #[test]
    fn test_formatted_error_code() {
        let err = FormattedError::new("boom").with_extension("code", json!("BAD_USER_INPUT"));
        assert_eq!(err.code(), Some("BAD_USER_INPUT"));
        assert_eq!(FormattedError::new("plain").code(), None);
    }
}
