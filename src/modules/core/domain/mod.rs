//! Domain models for Trellis configuration

mod body;
mod config;
mod cors;
mod environment;
mod options;
mod playground;
mod toggle;
mod upload;

pub use body::{BodyParserConfig, BodyParserOptions, BodyType};
pub use config::{
    GraphQLConfig, HealthCheckConfig, ServerConfig, TrellisConfig, DEFAULT_GRAPHQL_PATH,
    HEALTH_CHECK_PATH,
};
pub use cors::{CorsConfig, CorsOrigin, CorsPolicy, DEFAULT_CORS_METHODS};
pub use environment::{Environment, ENVIRONMENT_VAR};
pub use options::{ErrorFormatter, GraphQLOptions};
pub use playground::{PlaygroundConfig, DEFAULT_PLAYGROUND_VERSION};
pub use toggle::Toggle;
pub use upload::{FileUploadOptions, UploadsConfig};
