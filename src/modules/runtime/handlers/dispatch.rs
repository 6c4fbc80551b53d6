//! Final handler on the GraphQL path

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use tracing::debug;

use super::GraphQLHandler;
use crate::negotiate::prefers_html;

/// State for [`dispatch`]
#[derive(Debug, Clone)]
pub struct DispatchState {
    handler: GraphQLHandler,
    /// Pre-rendered explorer page; `None` when the explorer is disabled
    playground: Option<Arc<str>>,
}

impl DispatchState {
    pub fn new(handler: GraphQLHandler, playground: Option<String>) -> Self {
        Self {
            handler,
            playground: playground.map(Arc::from),
        }
    }
}

/// Serve the explorer to browsers, everything else to the request handler
pub async fn dispatch(
    State(state): State<Arc<DispatchState>>,
    request: Request,
    _next: Next,
) -> Response {
    if let Some(page) = &state.playground {
        if request.method() == Method::GET && prefers_html(request.headers()) {
            debug!("Serving GraphQL Playground");
            return Html(page.to_string()).into_response();
        }
    }

    match state.handler.handle(request).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}
