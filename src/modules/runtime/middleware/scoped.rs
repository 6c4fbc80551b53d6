//! Path scoping for tower layers

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::Request;
use futures::future::Either;
use tower::{Layer, Service};

/// Applies `layer` only to requests whose path equals `path`
///
/// Requests for any other path skip the wrapped middleware and go straight
/// to the inner service.
#[derive(Clone)]
pub struct ScopedLayer<L> {
    path: Arc<str>,
    layer: L,
}

impl<L> ScopedLayer<L> {
    pub fn new(path: impl Into<Arc<str>>, layer: L) -> Self {
        Self {
            path: path.into(),
            layer,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl<L, S> Layer<S> for ScopedLayer<L>
where
    L: Layer<S>,
    S: Clone,
{
    type Service = Scoped<L::Service, S>;

    fn layer(&self, inner: S) -> Self::Service {
        Scoped {
            path: self.path.clone(),
            scoped: self.layer.layer(inner.clone()),
            bypass: inner,
        }
    }
}

/// Service produced by [`ScopedLayer`]
#[derive(Clone)]
pub struct Scoped<T, S> {
    path: Arc<str>,
    scoped: T,
    bypass: S,
}

impl<T, S, B> Service<Request<B>> for Scoped<T, S>
where
    T: Service<Request<B>>,
    S: Service<Request<B>, Response = T::Response, Error = T::Error>,
{
    type Response = T::Response;
    type Error = T::Error;
    type Future = Either<T::Future, S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        if self.scoped.poll_ready(cx)?.is_pending() {
            return Poll::Pending;
        }
        self.bypass.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        if req.uri().path() == &*self.path {
            Either::Left(self.scoped.call(req))
        } else {
            Either::Right(self.bypass.call(req))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{HeaderValue, StatusCode};
    use axum::middleware::map_response;
    use axum::response::Response;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    async fn tag(mut response: Response) -> Response {
        response
            .headers_mut()
            .insert("x-scoped", HeaderValue::from_static("yes"));
        response
    }

    fn app() -> Router {
        Router::new()
            .route("/graphql", get(|| async { "gql" }))
            .route("/other", get(|| async { "other" }))
            .layer(ScopedLayer::new("/graphql", map_response(tag)))
    }

    #[tokio::test]
    async fn test_layer_runs_on_matching_path() {
        let response = app()
            .oneshot(Request::get("/graphql").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-scoped"], "yes");
    }

    #[tokio::test]
    async fn test_layer_skipped_for_other_paths() {
        let response = app()
            .oneshot(Request::get("/other").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("x-scoped").is_none());
    }

    #[tokio::test]
    async fn test_path_match_is_exact() {
        let response = app()
            .oneshot(Request::get("/graphql/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().get("x-scoped").is_none());
    }
}
