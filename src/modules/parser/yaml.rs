//! YAML configuration parser

use trellis_core::{TrellisConfig, TrellisError};

use crate::env::EnvSubstitutor;

/// YAML parser for Trellis configuration files
pub struct YamlParser;

impl YamlParser {
    /// Parse a YAML string into a configuration, substituting environment
    /// variables first
    pub fn parse(content: &str) -> Result<TrellisConfig, TrellisError> {
        let substituted = EnvSubstitutor::new().substitute(content)?;
        Self::parse_raw(&substituted)
    }

    /// Parse a YAML string without environment variable substitution
    pub fn parse_raw(content: &str) -> Result<TrellisConfig, TrellisError> {
        serde_yaml::from_str::<TrellisConfig>(content)
            .map_err(|e| TrellisError::Config(format!("YAML parse error: {}", e)))
    }
}
