//! Health probe endpoint

use std::future::Future;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, request::Parts, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::future::{BoxFuture, FutureExt};
use tracing::warn;
use trellis_types::{HealthResponse, HEALTH_CONTENT_TYPE};

/// Application supplied health check
pub type HealthCheckFn = Arc<dyn Fn(&Parts) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Wrap an async closure as a [`HealthCheckFn`]
pub fn health_check_fn<F, Fut>(f: F) -> HealthCheckFn
where
    F: Fn(&Parts) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |parts| f(parts).boxed())
}

/// State for [`health_check`]
#[derive(Clone, Default)]
pub struct HealthState {
    on_health_check: Option<HealthCheckFn>,
}

impl HealthState {
    pub fn new(on_health_check: Option<HealthCheckFn>) -> Self {
        Self { on_health_check }
    }
}

/// Answers the health probe; never calls the rest of the stack
pub async fn health_check(
    State(state): State<Arc<HealthState>>,
    request: Request,
    _next: Next,
) -> Response {
    let (parts, _body) = request.into_parts();

    let (status, body) = match &state.on_health_check {
        None => (StatusCode::OK, HealthResponse::pass()),
        Some(check) => match check(&parts).await {
            Ok(()) => (StatusCode::OK, HealthResponse::pass()),
            Err(err) => {
                warn!("Health check failed: {:#}", err);
                (StatusCode::SERVICE_UNAVAILABLE, HealthResponse::fail())
            }
        },
    };

    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(HEALTH_CONTENT_TYPE),
    );
    response
}
