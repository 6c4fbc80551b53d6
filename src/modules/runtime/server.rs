//! Middleware installation and HTTP server for Trellis

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::request::Parts;
use axum::middleware::from_fn_with_state;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};
use trellis_core::{
    BodyParserConfig, CorsConfig, Environment, FileUploadOptions, GraphQLOptions,
    PlaygroundConfig, ServerConfig, TrellisConfig, TrellisError, DEFAULT_GRAPHQL_PATH,
    HEALTH_CHECK_PATH,
};

use crate::handlers::{
    dispatch, health_check, health_check_fn, render_playground_page, DispatchState,
    GraphQLHandler, HealthCheckFn, HealthState, OptionsSource, PlaygroundRenderOptions,
};
use crate::middleware::{cors_layer, parse_body, upload_middleware, ScopedLayer, UploadState};
use crate::processor::HttpQueryProcessor;

/// How the GraphQL endpoint is mounted on an application
///
/// Read once by [`GraphQLServer::apply_middleware`].
#[derive(Clone)]
pub struct ServerRegistration {
    pub path: String,
    pub cors: CorsConfig,
    pub body_parser: BodyParserConfig,
    pub disable_health_check: bool,
    pub on_health_check: Option<HealthCheckFn>,
    /// Serve the explorer page; `None` follows the environment
    pub gui: Option<bool>,
}

impl Default for ServerRegistration {
    fn default() -> Self {
        Self {
            path: DEFAULT_GRAPHQL_PATH.to_string(),
            cors: CorsConfig::default(),
            body_parser: BodyParserConfig::default(),
            disable_health_check: false,
            on_health_check: None,
            gui: None,
        }
    }
}

impl ServerRegistration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registration matching a configuration file
    pub fn from_config(config: &TrellisConfig) -> Self {
        Self {
            path: config.graphql.path.clone(),
            cors: config.cors.clone(),
            body_parser: config.body_parser.clone(),
            disable_health_check: !config.health_check.enabled,
            on_health_check: None,
            gui: config.gui,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_cors(mut self, cors: impl Into<CorsConfig>) -> Self {
        self.cors = cors.into();
        self
    }

    pub fn with_body_parser(mut self, body_parser: impl Into<BodyParserConfig>) -> Self {
        self.body_parser = body_parser.into();
        self
    }

    pub fn with_health_check_disabled(mut self, disabled: bool) -> Self {
        self.disable_health_check = disabled;
        self
    }

    /// Run `check` for every health probe; an error answers 503
    pub fn on_health_check<F, Fut>(mut self, check: F) -> Self
    where
        F: Fn(&Parts) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on_health_check = Some(health_check_fn(check));
        self
    }

    pub fn with_gui(mut self, gui: bool) -> Self {
        self.gui = Some(gui);
        self
    }
}

/// A GraphQL endpoint that can be installed on an axum application
pub struct GraphQLServer {
    processor: Arc<dyn HttpQueryProcessor>,
    options: OptionsSource,
    uploads: Option<FileUploadOptions>,
    subscriptions_path: Option<String>,
    playground: PlaygroundConfig,
    environment: Environment,
}

impl GraphQLServer {
    /// Server with options and explorer defaults taken from `TRELLIS_ENV`
    pub fn new(processor: Arc<dyn HttpQueryProcessor>) -> Self {
        let environment = Environment::from_env();
        Self {
            processor,
            options: GraphQLOptions::for_environment(environment).into(),
            uploads: Some(FileUploadOptions::default()),
            subscriptions_path: None,
            playground: PlaygroundConfig::default(),
            environment,
        }
    }

    /// Server configured from a configuration file
    pub fn from_config(
        processor: Arc<dyn HttpQueryProcessor>,
        config: &TrellisConfig,
        environment: Environment,
    ) -> Self {
        Self {
            processor,
            options: config.graphql.options(environment).into(),
            uploads: config.uploads.resolve(),
            subscriptions_path: config.graphql.subscriptions_path.clone(),
            playground: config.playground.clone(),
            environment,
        }
    }

    pub fn with_options(mut self, options: impl Into<OptionsSource>) -> Self {
        self.options = options.into();
        self
    }

    /// Upload limits; `None` disables multipart parsing
    pub fn with_uploads(mut self, uploads: Option<FileUploadOptions>) -> Self {
        self.uploads = uploads;
        self
    }

    pub fn with_subscriptions_path(mut self, path: impl Into<String>) -> Self {
        self.subscriptions_path = Some(path.into());
        self
    }

    pub fn with_playground(mut self, playground: PlaygroundConfig) -> Self {
        self.playground = playground;
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Request handler bound to this server's options and processor
    pub fn handler(&self) -> Result<GraphQLHandler, TrellisError> {
        GraphQLHandler::new(Some(self.options.clone()), self.processor.clone())
    }

    /// Install the GraphQL middleware stack on `app`
    ///
    /// Layers only wrap routes that already exist, so call this after the
    /// application's own routes have been added. From the outside in the
    /// stack is: health probe, CORS, body parser, upload parser, dispatch.
    pub fn apply_middleware<S>(
        &self,
        app: Router<S>,
        registration: ServerRegistration,
    ) -> Result<Router<S>, TrellisError>
    where
        S: Clone + Send + Sync + 'static,
    {
        let path = registration.path.as_str();
        if !path.starts_with('/') {
            return Err(TrellisError::Config(format!(
                "GraphQL path must start with '/': {}",
                path
            )));
        }

        let handler = self.handler()?;
        let gui = registration
            .gui
            .unwrap_or(!self.environment.is_production());
        let playground = gui.then(|| {
            let subscription_endpoint = self
                .subscriptions_path
                .clone()
                .unwrap_or_else(|| path.to_string());
            render_playground_page(&PlaygroundRenderOptions::from_config(
                path,
                Some(subscription_endpoint),
                &self.playground,
            ))
        });

        let dispatch_state = DispatchState::new(handler.clone(), playground);
        let mut app = app.layer(ScopedLayer::new(
            path,
            from_fn_with_state(Arc::new(dispatch_state), dispatch),
        ));

        if let Some(limits) = &self.uploads {
            let state = UploadState::new(limits.clone(), handler.options().clone());
            app = app.layer(ScopedLayer::new(
                path,
                from_fn_with_state(Arc::new(state), upload_middleware),
            ));
        }

        if let Some(options) = registration.body_parser.resolve() {
            app = app.layer(ScopedLayer::new(
                path,
                from_fn_with_state(Arc::new(options), parse_body),
            ));
        }

        if let Some(policy) = registration.cors.resolve() {
            app = app.layer(ScopedLayer::new(path, cors_layer(&policy)?));
        }

        if !registration.disable_health_check {
            let state = HealthState::new(registration.on_health_check.clone());
            app = app.layer(ScopedLayer::new(
                HEALTH_CHECK_PATH,
                from_fn_with_state(Arc::new(state), health_check),
            ));
        }

        info!(
            path,
            gui,
            cors = registration.cors.is_enabled(),
            body_parser = registration.body_parser.is_enabled(),
            uploads = self.uploads.is_some(),
            health_check = !registration.disable_health_check,
            "GraphQL middleware installed"
        );

        Ok(app)
    }
}

/// Apply port override to a configuration
fn apply_port_override(mut config: TrellisConfig, port_override: Option<u16>) -> TrellisConfig {
    if let Some(port) = port_override {
        if let Some(ref mut server) = config.server {
            server.port = Some(port);
        } else {
            config.server = Some(ServerConfig {
                port: Some(port),
                ..ServerConfig::default()
            });
        }
    }
    config
}

/// Runtime server for Trellis
pub struct Runtime {
    config: Arc<TrellisConfig>,
    router: Router,
}

impl Runtime {
    /// Create a runtime serving an already assembled router
    pub fn new(config: TrellisConfig, router: Router) -> Self {
        Self {
            config: Arc::new(config),
            router,
        }
    }

    /// Install `server` on `app` as described by `config` and serve the result
    pub fn with_server(
        config: TrellisConfig,
        server: &GraphQLServer,
        app: Router,
        port_override: Option<u16>,
    ) -> Result<Self, TrellisError> {
        let config = apply_port_override(config, port_override);
        let router = server.apply_middleware(app, ServerRegistration::from_config(&config))?;
        Ok(Self::new(config, router))
    }

    /// Build the Axum router
    fn build_router(&self) -> Router {
        self.router
            .clone()
            .layer(TimeoutLayer::new(self.config.timeout()))
            .layer(TraceLayer::new_for_http())
    }

    /// Start the server
    pub async fn run(&self) -> Result<(), TrellisError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host(), self.config.port())
            .parse()
            .map_err(|e| TrellisError::Server(format!("Invalid address: {}", e)))?;

        let app = self.build_router();

        info!("Starting Trellis server on http://{}", addr);
        info!("Service: {}", self.config.name);
        info!("GraphQL endpoint: http://{}{}", addr, self.config.graphql.path);
        if self.config.health_check.enabled {
            info!("Health check: http://{}{}", addr, HEALTH_CHECK_PATH);
        }

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| TrellisError::Server(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(Self::shutdown_signal())
            .await
            .map_err(|e| TrellisError::Server(format!("Server error: {}", e)))?;

        info!("Server stopped");
        Ok(())
    }

    /// Wait for shutdown signal
    async fn shutdown_signal() {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to install CTRL+C signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    error!("Failed to install SIGTERM signal handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                debug!("Received CTRL+C, shutting down...");
            }
            _ = terminate => {
                debug!("Received SIGTERM, shutting down...");
            }
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &TrellisConfig {
        &self.config
    }
}
