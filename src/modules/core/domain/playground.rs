//! Explorer page configuration

use serde::Deserialize;
use serde_json::Value;

/// GraphQL Playground release loaded by the explorer page
pub const DEFAULT_PLAYGROUND_VERSION: &str = "1.7.26";

/// Explorer page settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    /// Playground release to load from the CDN
    pub version: String,

    /// Page title
    pub title: Option<String>,

    /// Playground settings object (editor theme, credentials, ...)
    pub settings: Option<Value>,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_PLAYGROUND_VERSION.to_string(),
            title: None,
            settings: None,
        }
    }
}
