//! Conversion of Trellis errors into HTTP responses
//!
//! The request handler answers recognized query errors itself. Everything
//! else reaches axum as an [`ErrorResponse`], which renders the status the
//! error exposes (or 500) and attaches an [`ErrorReport`] to the response
//! extensions so outer layers can observe what went wrong.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};
use trellis_core::TrellisError;
use trellis_types::FormattedError;

/// Details of an error that was not answered by the request handler
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub status: StatusCode,
    pub message: String,
    /// The error as formatted for GraphQL clients, when one was produced
    pub formatted: Option<FormattedError>,
}

/// An error handed to the framework's error handling
#[derive(Debug)]
pub struct ErrorResponse {
    error: TrellisError,
    formatted: Option<FormattedError>,
}

impl ErrorResponse {
    pub fn new(error: TrellisError) -> Self {
        Self {
            error,
            formatted: None,
        }
    }

    /// Attach the client-facing formatted version of the error
    pub fn with_formatted(mut self, formatted: FormattedError) -> Self {
        self.formatted = Some(formatted);
        self
    }

    pub fn error(&self) -> &TrellisError {
        &self.error
    }
}

impl From<TrellisError> for ErrorResponse {
    fn from(error: TrellisError) -> Self {
        Self::new(error)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = if self.error.is_exposed() {
            StatusCode::from_u16(self.error.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if self.error.is_error() {
            error!("Unhandled error: {}", self.error);
        } else {
            warn!("Request failed with {}: {}", status, self.error);
        }

        let body = if self.error.is_exposed() {
            self.error.sanitized_message()
        } else {
            status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string()
        };

        let mut response = (status, body).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response.extensions_mut().insert(ErrorReport {
            status,
            message: self.error.to_string(),
            formatted: self.formatted,
        });
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexposed_error_is_500() {
        let response = ErrorResponse::new(TrellisError::Internal("db gone".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let report = response.extensions().get::<ErrorReport>().unwrap();
        assert_eq!(report.message, "Internal error: db gone");
    }

    #[test]
    fn test_exposed_error_keeps_status() {
        let response =
            ErrorResponse::new(TrellisError::body_parse(413, "request entity too large"))
                .into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_formatted_error_is_reported() {
        let response = ErrorResponse::new(TrellisError::Internal("x".into()))
            .with_formatted(FormattedError::new("masked"))
            .into_response();
        let report = response.extensions().get::<ErrorReport>().unwrap();
        assert_eq!(report.formatted.as_ref().unwrap().message, "masked");
    }
}
