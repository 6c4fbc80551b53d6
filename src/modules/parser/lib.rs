//! Configuration parsing for Trellis
//!
//! This crate handles parsing of YAML configuration files, environment
//! variable substitution and validation.

pub mod env;
pub mod validator;
pub mod yaml;

pub use validator::ConfigValidator;
pub use yaml::YamlParser;

use trellis_core::{TrellisConfig, TrellisError};

/// Parse a configuration file from a path
pub fn parse_file(path: &str) -> Result<TrellisConfig, TrellisError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| TrellisError::Config(format!("Failed to read file '{}': {}", path, e)))?;

    parse_string(&content)
}

/// Parse a configuration from a string
pub fn parse_string(content: &str) -> Result<TrellisConfig, TrellisError> {
    let config = YamlParser::parse(content)?;

    let validator = ConfigValidator::new();
    validator.validate(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_simple_config() {
        let yaml = r#"
name: test-graph
graphql:
  path: /api/graphql
cors: false
"#;
        let config = parse_string(yaml).unwrap();
        assert_eq!(config.name, "test-graph");
        assert_eq!(config.graphql.path, "/api/graphql");
        assert!(!config.cors.is_enabled());
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name: from-file\nserver:\n  port: 8081").unwrap();
        let config = parse_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.port(), 8081);
    }

    #[test]
    fn test_parse_missing_file() {
        let result = parse_file("/nonexistent/trellis.yaml");
        assert!(matches!(result, Err(TrellisError::Config(_))));
    }

    #[test]
    fn test_parse_rejects_invalid_path() {
        let yaml = "name: bad\ngraphql:\n  path: graphql\n";
        assert!(matches!(parse_string(yaml), Err(TrellisError::Validation(_))));
    }
}
