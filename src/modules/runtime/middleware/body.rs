//! Request body parsing
//!
//! Decodes JSON, urlencoded form and plain text bodies into a [`ParsedBody`]
//! request extension. Requests with any other content type get an empty
//! object so downstream handlers can tell "parsed, but nothing usable" apart
//! from "no parser ran".

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde_json::{json, Map, Value};
use tracing::debug;
use trellis_core::{BodyParserOptions, BodyType, TrellisError};

use crate::error::ErrorResponse;

/// Decoded request body
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBody(pub Value);

/// Middleware that decodes the request body into a [`ParsedBody`] extension
pub async fn parse_body(
    State(options): State<Arc<BodyParserOptions>>,
    request: Request,
    next: Next,
) -> Response {
    match read_body(&options, request).await {
        Ok(request) => next.run(request).await,
        Err(err) => ErrorResponse::from(err).into_response(),
    }
}

async fn read_body(options: &BodyParserOptions, request: Request) -> Result<Request, TrellisError> {
    if request.extensions().get::<ParsedBody>().is_some() {
        return Ok(request);
    }

    let body_type = classify(request.headers()).filter(|ty| options.enables(*ty));
    let Some(body_type) = body_type else {
        let mut request = request;
        request.extensions_mut().insert(ParsedBody(json!({})));
        return Ok(request);
    };

    let (mut parts, body) = request.into_parts();
    let bytes = collect_limited(body, options.limit_for(body_type)).await?;
    let value = decode(body_type, &bytes, options.strict)?;
    debug!(?body_type, size = bytes.len(), "Parsed request body");

    parts.extensions.insert(ParsedBody(value));
    Ok(Request::from_parts(parts, Body::from(bytes)))
}

/// Body encoding named by the `Content-Type` header, if it is one we decode
fn classify(headers: &HeaderMap) -> Option<BodyType> {
    let content_type = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "application/json" | "application/csp-report" => Some(BodyType::Json),
        "application/x-www-form-urlencoded" => Some(BodyType::Form),
        "text/plain" => Some(BodyType::Text),
        other if other.starts_with("application/") && other.ends_with("+json") => {
            Some(BodyType::Json)
        }
        _ => None,
    }
}

async fn collect_limited(body: Body, limit: usize) -> Result<Bytes, TrellisError> {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            Err(TrellisError::body_parse(413, "request entity too large"))
        }
        Err(err) => Err(TrellisError::body_parse(
            400,
            format!("failed to read request body: {}", err),
        )),
    }
}

fn decode(body_type: BodyType, bytes: &[u8], strict: bool) -> Result<Value, TrellisError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| TrellisError::body_parse(400, "request body is not valid UTF-8"))?;

    match body_type {
        BodyType::Json => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(json!({}));
            }
            if strict && !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
                return Err(TrellisError::body_parse(
                    400,
                    "invalid JSON, only supports object and array",
                ));
            }
            serde_json::from_str(trimmed)
                .map_err(|err| TrellisError::body_parse(400, format!("invalid JSON: {}", err)))
        }
        BodyType::Form => Ok(parse_urlencoded(bytes)),
        BodyType::Text => Ok(Value::String(text.to_string())),
    }
}

/// Decode `application/x-www-form-urlencoded` data into a JSON object
///
/// Values stay strings; a key that appears more than once becomes an array.
pub fn parse_urlencoded(input: &[u8]) -> Value {
    let mut object = Map::new();
    for (key, value) in url::form_urlencoded::parse(input) {
        let value = Value::String(value.into_owned());
        match object.get_mut(key.as_ref()) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                object.insert(key.into_owned(), value);
            }
        }
    }
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::middleware::from_fn_with_state;
    use axum::routing::post;
    use axum::{Extension, Router};
    use tower::ServiceExt;

    async fn echo(Extension(ParsedBody(body)): Extension<ParsedBody>) -> String {
        body.to_string()
    }

    fn app(options: BodyParserOptions) -> Router {
        Router::new()
            .route("/graphql", post(echo))
            .layer(from_fn_with_state(Arc::new(options), parse_body))
    }

    async fn send(options: BodyParserOptions, content_type: &str, body: &str) -> (StatusCode, String) {
        let request = axum::http::Request::post("/graphql")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app(options).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_json_body() {
        let (status, body) = send(
            BodyParserOptions::default(),
            "application/json; charset=utf-8",
            r#"{"query":"{ hello }"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"query":"{ hello }"}"#);
    }

    #[tokio::test]
    async fn test_vendor_json_body() {
        let (status, body) = send(
            BodyParserOptions::default(),
            "application/graphql-request+json",
            r#"[{"query":"{ a }"}]"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"[{"query":"{ a }"}]"#);
    }

    #[tokio::test]
    async fn test_form_body() {
        let (status, body) = send(
            BodyParserOptions::default(),
            "application/x-www-form-urlencoded",
            "query=%7B+hello+%7D&operationName=Q",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value, json!({ "query": "{ hello }", "operationName": "Q" }));
    }

    #[tokio::test]
    async fn test_unknown_content_type_yields_empty_object() {
        let (status, body) = send(BodyParserOptions::default(), "application/xml", "<q/>").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "{}");

        let (_, body) = send(BodyParserOptions::default(), "text/plain", "{ hello }").await;
        assert_eq!(body, "{}");
    }

    #[tokio::test]
    async fn test_text_body_when_enabled() {
        let options = BodyParserOptions {
            enable_types: vec![BodyType::Json, BodyType::Text],
            ..BodyParserOptions::default()
        };
        let (_, body) = send(options, "text/plain", "{ hello }").await;
        assert_eq!(body, r#""{ hello }""#);
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let (status, _) = send(BodyParserOptions::default(), "application/json", "{ nope").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_strict_rejects_scalars() {
        let (status, body) = send(BodyParserOptions::default(), "application/json", "42").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "invalid JSON, only supports object and array");

        let lenient = BodyParserOptions {
            strict: false,
            ..BodyParserOptions::default()
        };
        let (status, body) = send(lenient, "application/json", "42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "42");
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let options = BodyParserOptions {
            json_limit: 8,
            ..BodyParserOptions::default()
        };
        let (status, _) = send(options, "application/json", r#"{"query":"{ hello }"}"#).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_parse_urlencoded_repeated_keys() {
        let value = parse_urlencoded(b"a=1&b=2&a=3&a=4");
        assert_eq!(value, json!({ "a": ["1", "3", "4"], "b": "2" }));
        assert_eq!(parse_urlencoded(b""), json!({}));
    }
}
