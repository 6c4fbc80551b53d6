//! Configuration validation

use once_cell::sync::Lazy;
use regex::Regex;
use trellis_core::{
    CorsOrigin, CorsPolicy, Toggle, TrellisConfig, TrellisError, HEALTH_CHECK_PATH,
};

/// Regex pattern for valid service names (lower-kebab-case or lower_snake_case)
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9]*(?:[-_][a-z0-9]+)*$").unwrap());

/// Regex pattern for mount paths: absolute, no query or fragment
static PATH_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/[^\s?#]*$").unwrap());

/// Regex pattern for HTTP method tokens
static METHOD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[!#$%&'*+\-.^_`|~0-9A-Za-z]+$").unwrap());

/// Configuration validator
pub struct ConfigValidator {
    /// Whether to validate names strictly
    strict_names: bool,
}

impl ConfigValidator {
    /// Create a new validator with default settings
    pub fn new() -> Self {
        Self { strict_names: true }
    }

    /// Create a validator with lenient name checking
    pub fn lenient() -> Self {
        Self {
            strict_names: false,
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self, config: &TrellisConfig) -> Result<(), TrellisError> {
        self.validate_name(&config.name)?;
        self.validate_server(config)?;
        self.validate_paths(config)?;
        self.validate_cors(config)?;
        self.validate_limits(config)?;

        if config.playground.version.trim().is_empty() {
            return Err(TrellisError::Validation(
                "Playground version cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_name(&self, name: &str) -> Result<(), TrellisError> {
        if name.is_empty() {
            return Err(TrellisError::Validation(
                "Service name cannot be empty".to_string(),
            ));
        }

        if self.strict_names && !NAME_PATTERN.is_match(name) {
            return Err(TrellisError::Validation(format!(
                "Invalid service name '{}': must be lower-kebab-case or lower_snake_case",
                name
            )));
        }

        Ok(())
    }

    fn validate_server(&self, config: &TrellisConfig) -> Result<(), TrellisError> {
        if let Some(server) = &config.server {
            if server.port == Some(0) {
                return Err(TrellisError::Validation("Port cannot be 0".to_string()));
            }
            if server.timeout_secs == Some(0) {
                return Err(TrellisError::Validation(
                    "Request timeout must be at least one second".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn validate_paths(&self, config: &TrellisConfig) -> Result<(), TrellisError> {
        let path = &config.graphql.path;
        if !PATH_PATTERN.is_match(path) {
            return Err(TrellisError::Validation(format!(
                "Invalid GraphQL path '{}': must start with '/' and contain no query or fragment",
                path
            )));
        }

        if let Some(subscriptions) = &config.graphql.subscriptions_path {
            if !PATH_PATTERN.is_match(subscriptions) {
                return Err(TrellisError::Validation(format!(
                    "Invalid subscriptions path '{}'",
                    subscriptions
                )));
            }
        }

        if config.health_check.enabled && path == HEALTH_CHECK_PATH {
            return Err(TrellisError::Validation(format!(
                "GraphQL path cannot be the health check path '{}'",
                HEALTH_CHECK_PATH
            )));
        }

        Ok(())
    }

    fn validate_cors(&self, config: &TrellisConfig) -> Result<(), TrellisError> {
        if let Toggle::Custom(policy) = &config.cors {
            validate_cors_policy(policy)?;
        }
        Ok(())
    }

    fn validate_limits(&self, config: &TrellisConfig) -> Result<(), TrellisError> {
        if let Toggle::Custom(body) = &config.body_parser {
            if body.enable_types.is_empty() {
                return Err(TrellisError::Validation(
                    "Body parser must enable at least one type".to_string(),
                ));
            }
            if body.json_limit == 0 || body.form_limit == 0 || body.text_limit == 0 {
                return Err(TrellisError::Validation(
                    "Body parser limits must be greater than zero".to_string(),
                ));
            }
        }

        if let Toggle::Custom(uploads) = &config.uploads {
            if uploads.max_field_size == 0 {
                return Err(TrellisError::Validation(
                    "Upload max_field_size must be greater than zero".to_string(),
                ));
            }
            if uploads.max_file_size == Some(0) || uploads.max_files == Some(0) {
                return Err(TrellisError::Validation(
                    "Upload limits must be greater than zero; use `uploads: false` to disable"
                        .to_string(),
                ));
            }
        }

        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Check a CORS policy for combinations browsers reject
pub fn validate_cors_policy(policy: &CorsPolicy) -> Result<(), TrellisError> {
    if policy.credentials && policy.origin == CorsOrigin::Any {
        return Err(TrellisError::Validation(
            "CORS credentials cannot be combined with a wildcard origin".to_string(),
        ));
    }

    if let CorsOrigin::List(origins) = &policy.origin {
        if origins.is_empty() {
            return Err(TrellisError::Validation(
                "CORS origin list cannot be empty".to_string(),
            ));
        }
    }

    for method in &policy.methods {
        if !METHOD_PATTERN.is_match(method) {
            return Err(TrellisError::Validation(format!(
                "Invalid CORS method '{}'",
                method
            )));
        }
    }

    Ok(())
}
