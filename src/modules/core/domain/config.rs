//! Root service configuration

use std::time::Duration;

use serde::Deserialize;

use super::{
    BodyParserConfig, CorsConfig, Environment, GraphQLOptions, PlaygroundConfig, UploadsConfig,
};

/// Path the GraphQL endpoint is mounted at unless configured otherwise
pub const DEFAULT_GRAPHQL_PATH: &str = "/graphql";

/// Fixed path of the health probe, independent of the GraphQL path
pub const HEALTH_CHECK_PATH: &str = "/.well-known/apollo/server-health";

/// Root configuration model that represents a Trellis configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct TrellisConfig {
    /// Name of the service
    pub name: String,

    /// Listener configuration (optional)
    #[serde(default)]
    pub server: Option<ServerConfig>,

    /// GraphQL endpoint configuration
    #[serde(default)]
    pub graphql: GraphQLConfig,

    /// CORS policy for the GraphQL path
    #[serde(default)]
    pub cors: CorsConfig,

    /// Body parser policy for the GraphQL path
    #[serde(default)]
    pub body_parser: BodyParserConfig,

    /// Health probe configuration
    #[serde(default)]
    pub health_check: HealthCheckConfig,

    /// Serve the explorer page to browsers; defaults to on outside production
    #[serde(default)]
    pub gui: Option<bool>,

    /// Explorer page settings
    #[serde(default)]
    pub playground: PlaygroundConfig,

    /// Multipart upload limits
    #[serde(default)]
    pub uploads: UploadsConfig,
}

impl TrellisConfig {
    /// Create a configuration with defaults for everything but the name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server: None,
            graphql: GraphQLConfig::default(),
            cors: CorsConfig::default(),
            body_parser: BodyParserConfig::default(),
            health_check: HealthCheckConfig::default(),
            gui: None,
            playground: PlaygroundConfig::default(),
            uploads: UploadsConfig::default(),
        }
    }

    /// Get the server port, defaulting to 4000
    pub fn port(&self) -> u16 {
        self.server.as_ref().and_then(|s| s.port).unwrap_or(4000)
    }

    /// Get the bind host, defaulting to all interfaces
    pub fn host(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.host.as_deref())
            .unwrap_or("0.0.0.0")
    }

    /// Get the request timeout, defaulting to 30 seconds
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(
            self.server
                .as_ref()
                .and_then(|s| s.timeout_secs)
                .unwrap_or(30),
        )
    }
}

/// Listener configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    /// Address to bind (default: 0.0.0.0)
    #[serde(default)]
    pub host: Option<String>,

    /// Port to listen on (default: 4000)
    #[serde(default)]
    pub port: Option<u16>,

    /// Request timeout in seconds (default: 30)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// GraphQL endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphQLConfig {
    /// Path the endpoint is mounted at
    pub path: String,

    /// Subscription endpoint advertised by the explorer page
    pub subscriptions_path: Option<String>,

    /// Override the environment's debug default
    pub debug: Option<bool>,

    /// Override the environment's introspection default
    pub introspection: Option<bool>,
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_GRAPHQL_PATH.to_string(),
            subscriptions_path: None,
            debug: None,
            introspection: None,
        }
    }
}

impl GraphQLConfig {
    /// Executor options for the given environment with overrides applied
    pub fn options(&self, env: Environment) -> GraphQLOptions {
        let mut options = GraphQLOptions::for_environment(env);
        if let Some(debug) = self.debug {
            options.debug = debug;
        }
        if let Some(introspection) = self.introspection {
            options.introspection = introspection;
        }
        options
    }
}

/// Health probe configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    pub enabled: bool,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Toggle;

    #[test]
    fn test_config_defaults() {
        let config = TrellisConfig::new("test");
        assert_eq!(config.port(), 4000);
        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.graphql.path, DEFAULT_GRAPHQL_PATH);
        assert_eq!(config.cors, Toggle::Default);
        assert!(config.health_check.enabled);
    }

    #[test]
    fn test_graphql_options_overrides() {
        let config = GraphQLConfig {
            debug: Some(false),
            ..GraphQLConfig::default()
        };
        let options = config.options(Environment::Development);
        assert!(!options.debug);
        assert!(options.introspection);
    }
}
