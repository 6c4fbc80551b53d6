//! Run command implementation

use std::sync::Arc;

use axum::http::request::Parts;
use axum::Router;
use clap::Args;
use serde_json::json;
use tracing::info;
use trellis_core::{Environment, GraphQLOptions, TrellisError};
use trellis_parser::parse_file;
use trellis_runtime::{GraphQLServer, OptionsSource, Runtime, SchemaProcessor};

use crate::schema::demo_schema;

/// Header whose value becomes the `user` entry of the request context
const USER_HEADER: &str = "x-user";

/// Run command arguments
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Override server port
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl RunCommand {
    /// Execute the run command
    pub async fn execute(&self, config_path: &str) -> Result<(), TrellisError> {
        info!("Loading configuration from: {}", config_path);

        let config = parse_file(config_path)?;
        let environment = Environment::from_env();
        info!("Environment: {:?}", environment);

        let options = request_options(config.graphql.options(environment));
        let processor = Arc::new(SchemaProcessor::new(demo_schema()));
        let server =
            GraphQLServer::from_config(processor, &config, environment).with_options(options);

        let runtime = Runtime::with_server(config, &server, Router::new(), self.port)?;
        runtime.run().await?;

        Ok(())
    }
}

/// Options that expose the caller named by [`USER_HEADER`] to resolvers
fn request_options(base: GraphQLOptions) -> OptionsSource {
    OptionsSource::dynamic(move |parts: &Parts| {
        let user = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let options = match user {
            Some(user) => base.clone().with_context(json!({ "user": user })),
            None => base.clone(),
        };
        async move { Ok(options) }
    })
}
