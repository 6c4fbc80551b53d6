//! GraphQL request handler
//!
//! Pulls the operation out of an axum request, hands it to the configured
//! [`HttpQueryProcessor`] and turns the outcome back into a response.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::future::{BoxFuture, FutureExt};
use serde_json::json;
use tracing::{debug, warn};
use trellis_core::{GraphQLOptions, TrellisError};
use trellis_types::UploadedFiles;

use crate::error::ErrorResponse;
use crate::middleware::{parse_urlencoded, ParsedBody};
use crate::processor::{HttpQueryProcessor, HttpQueryRequest, NormalizedRequest};

/// Future returned by a per-request options function
pub type OptionsFuture = BoxFuture<'static, Result<GraphQLOptions, TrellisError>>;

/// Where the handler gets its [`GraphQLOptions`] from
#[derive(Clone)]
pub enum OptionsSource {
    /// The same options for every request
    Static(GraphQLOptions),
    /// Options computed from each request
    Dynamic(Arc<dyn Fn(&Parts) -> OptionsFuture + Send + Sync>),
}

impl OptionsSource {
    /// Compute options per request, e.g. to build a context from headers
    pub fn dynamic<F, Fut>(f: F) -> Self
    where
        F: Fn(&Parts) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<GraphQLOptions, TrellisError>> + Send + 'static,
    {
        OptionsSource::Dynamic(Arc::new(move |parts| f(parts).boxed()))
    }

    /// Options for this request
    pub async fn resolve(&self, parts: &Parts) -> Result<GraphQLOptions, TrellisError> {
        match self {
            OptionsSource::Static(options) => Ok(options.clone()),
            OptionsSource::Dynamic(f) => f(parts).await,
        }
    }
}

impl From<GraphQLOptions> for OptionsSource {
    fn from(options: GraphQLOptions) -> Self {
        OptionsSource::Static(options)
    }
}

impl fmt::Debug for OptionsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionsSource::Static(options) => f.debug_tuple("Static").field(options).finish(),
            OptionsSource::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Request handler bound to one options source and one processor
#[derive(Clone)]
pub struct GraphQLHandler {
    options: OptionsSource,
    processor: Arc<dyn HttpQueryProcessor>,
}

impl GraphQLHandler {
    pub fn new(
        options: Option<OptionsSource>,
        processor: Arc<dyn HttpQueryProcessor>,
    ) -> Result<Self, TrellisError> {
        let options = options
            .ok_or_else(|| TrellisError::Config("GraphQL server requires options.".to_string()))?;
        Ok(Self { options, processor })
    }

    pub fn options(&self) -> &OptionsSource {
        &self.options
    }

    /// Handle one GraphQL request
    ///
    /// Protocol errors reported by the processor are answered here with
    /// their status, headers and message. Any other error is returned so the
    /// framework can deal with it.
    pub async fn handle(&self, request: Request) -> Result<Response, ErrorResponse> {
        let (parts, _body) = request.into_parts();

        let query = if parts.method == Method::POST {
            parts.extensions.get::<ParsedBody>().map(|body| body.0.clone())
        } else {
            Some(
                parts
                    .uri
                    .query()
                    .map(|query| parse_urlencoded(query.as_bytes()))
                    .unwrap_or_else(|| json!({})),
            )
        };
        let uploads = parts.extensions.get::<UploadedFiles>().cloned();
        let options = self.options.resolve(&parts).await?;

        debug!(method = %parts.method, path = parts.uri.path(), "Dispatching GraphQL request");

        let request = HttpQueryRequest {
            method: parts.method.clone(),
            options,
            query,
            request: NormalizedRequest::from_parts(&parts),
            uploads,
        };

        match self.processor.run_http_query(request).await {
            Ok(response) => Ok(build_response(
                StatusCode::OK,
                &response.headers,
                response.graphql_response,
            )),
            Err(TrellisError::HttpQuery(err)) => {
                let status =
                    StatusCode::from_u16(err.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                debug!(status = err.status, "GraphQL request rejected: {}", err.message);
                Ok(build_response(status, &err.headers, err.message))
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl fmt::Debug for GraphQLHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphQLHandler")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Response with `body`, text/plain unless `headers` say otherwise
fn build_response(status: StatusCode, headers: &BTreeMap<String, String>, body: String) -> Response {
    let mut response = (status, body).into_response();
    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().insert(name, value);
            }
            _ => warn!("Skipping invalid response header {}", name),
        }
    }
    if !response.headers().contains_key(CONTENT_TYPE) {
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingProcessor;
    use axum::body::Body;
    use trellis_core::{Environment, HttpQueryError};

    fn options() -> GraphQLOptions {
        GraphQLOptions::for_environment(Environment::Development)
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_missing_options_rejected() {
        let err = GraphQLHandler::new(None, RecordingProcessor::echo()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: GraphQL server requires options."
        );
    }

    #[tokio::test]
    async fn test_post_uses_parsed_body() {
        let processor = RecordingProcessor::echo();
        let handler = GraphQLHandler::new(Some(options().into()), processor.clone()).unwrap();

        let payload = json!({ "query": "{ hello }", "variables": { "a": 1 }, "operationName": "Q" });
        let mut request = axum::http::Request::post("/graphql?query=ignored")
            .body(Body::from("ignored"))
            .unwrap();
        request
            .extensions_mut()
            .insert(ParsedBody(payload.clone()));

        let response = handler.handle(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-processed"], "yes");
        assert_eq!(processor.last().unwrap().query, Some(payload));
    }

    #[tokio::test]
    async fn test_post_without_parser_passes_none() {
        let processor = RecordingProcessor::echo();
        let handler = GraphQLHandler::new(Some(options().into()), processor.clone()).unwrap();
        let request = axum::http::Request::post("/graphql")
            .body(Body::empty())
            .unwrap();
        handler.handle(request).await.unwrap();
        assert_eq!(processor.last().unwrap().query, None);
    }

    #[tokio::test]
    async fn test_get_uses_query_string() {
        let processor = RecordingProcessor::echo();
        let handler = GraphQLHandler::new(Some(options().into()), processor.clone()).unwrap();

        let mut request = axum::http::Request::get("/graphql?query=%7B%20hello%20%7D&operationName=Q")
            .body(Body::from(r#"{"query":"{ body }"}"#))
            .unwrap();
        request
            .extensions_mut()
            .insert(ParsedBody(json!({ "query": "{ body }" })));

        handler.handle(request).await.unwrap();
        let recorded = processor.last().unwrap();
        assert_eq!(recorded.method, Method::GET);
        assert_eq!(
            recorded.query,
            Some(json!({ "query": "{ hello }", "operationName": "Q" }))
        );
    }

    #[tokio::test]
    async fn test_http_query_error_answered_locally() {
        let processor = RecordingProcessor::failing(
            HttpQueryError::new(400, "Syntax Error").with_header("X-Reason", "syntax"),
        );
        let handler = GraphQLHandler::new(Some(options().into()), processor).unwrap();
        let request = axum::http::Request::get("/graphql?query=%7B")
            .body(Body::empty())
            .unwrap();

        let response = handler.handle(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["x-reason"], "syntax");
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_string(response).await, "Syntax Error");
    }

    #[tokio::test]
    async fn test_other_errors_are_propagated() {
        let handler =
            GraphQLHandler::new(Some(options().into()), RecordingProcessor::internal()).unwrap();
        let request = axum::http::Request::get("/graphql?query=%7B%7D")
            .body(Body::empty())
            .unwrap();

        let err = handler.handle(request).await.unwrap_err();
        assert!(matches!(err.error(), TrellisError::Execution(_)));
    }

    #[tokio::test]
    async fn test_dynamic_options_resolved_per_request() {
        let processor = RecordingProcessor::echo();
        let source = OptionsSource::dynamic(|parts: &Parts| {
            let user = parts
                .headers
                .get("x-user")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            async move {
                Ok(GraphQLOptions::for_environment(Environment::Production)
                    .with_context(json!({ "user": user })))
            }
        });
        let handler = GraphQLHandler::new(Some(source), processor.clone()).unwrap();

        for user in ["ada", "bo"] {
            let request = axum::http::Request::get("/graphql?query=%7B%7D")
                .header("x-user", user)
                .body(Body::empty())
                .unwrap();
            handler.handle(request).await.unwrap();
            let recorded = processor.last().unwrap();
            assert_eq!(recorded.options.context, Some(json!({ "user": user })));
        }
    }

    #[tokio::test]
    async fn test_failing_options_function_propagates() {
        let source = OptionsSource::dynamic(|_: &Parts| async {
            Err(TrellisError::Internal("no session store".to_string()))
        });
        let handler = GraphQLHandler::new(Some(source), RecordingProcessor::echo()).unwrap();
        let request = axum::http::Request::get("/graphql")
            .body(Body::empty())
            .unwrap();
        let err = handler.handle(request).await.unwrap_err();
        assert!(matches!(err.error(), TrellisError::Internal(_)));
    }
}
