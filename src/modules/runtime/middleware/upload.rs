//! Multipart file uploads
//!
//! Implements the GraphQL multipart request convention: an `operations`
//! field holding the JSON payload, a `map` field naming which variables each
//! file belongs to, then the files themselves. Each file is replaced in the
//! payload by an [`UploadDescriptor`](trellis_types::UploadDescriptor) and the
//! file contents travel in an [`UploadedFiles`] request extension.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tower::{service_fn, Layer, ServiceExt};
use tracing::{debug, warn};
use trellis_core::{FileUploadOptions, TrellisError};
use trellis_types::{UploadedFile, UploadedFiles};

use super::ParsedBody;
use crate::error::ErrorResponse;
use crate::handlers::OptionsSource;

/// State for [`upload_middleware`]
#[derive(Debug, Clone)]
pub struct UploadState {
    limits: FileUploadOptions,
    options: OptionsSource,
}

impl UploadState {
    /// `options` formats errors that are not shown to clients as-is
    pub fn new(limits: FileUploadOptions, options: OptionsSource) -> Self {
        Self { limits, options }
    }
}

/// Middleware that parses multipart GraphQL requests
///
/// Requests that are not `multipart/form-data` pass through untouched.
pub async fn upload_middleware(
    State(state): State<Arc<UploadState>>,
    request: Request,
    next: Next,
) -> Response {
    if !is_multipart(request.headers()) {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();

    let mut multipart_request = Request::new(body);
    *multipart_request.headers_mut() = parts.headers.clone();
    *multipart_request.extensions_mut() = parts.extensions.clone();

    // Sizes are bounded per field and per file by `FileUploadOptions`, not by
    // axum's whole-body default
    let extract = DefaultBodyLimit::disable().layer(service_fn(|request: Request| async move {
        Ok::<_, Infallible>(Multipart::from_request(request, &()).await)
    }));
    let extracted = extract
        .oneshot(multipart_request)
        .await
        .unwrap_or_else(|never| match never {});

    let result = match extracted {
        Ok(multipart) => process_request(multipart, &state.limits).await,
        Err(rejection) => Err(TrellisError::upload(
            rejection.status().as_u16(),
            rejection.body_text(),
        )),
    };

    match result {
        Ok((operations, files)) => {
            debug!(files = files.len(), "Parsed multipart GraphQL request");
            parts.extensions.insert(ParsedBody(operations));
            parts.extensions.insert(files);
            next.run(Request::from_parts(parts, Body::empty())).await
        }
        Err(err) if err.is_exposed() => {
            warn!("Rejected multipart request: {}", err);
            let status =
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
            (status, status.canonical_reason().unwrap_or_default()).into_response()
        }
        Err(err) => {
            let response = match state.options.resolve(&parts).await {
                Ok(options) => {
                    let formatted = options.format_trellis_error(&err);
                    ErrorResponse::new(err).with_formatted(formatted)
                }
                Err(options_err) => {
                    warn!("Could not resolve options to format upload error: {}", options_err);
                    ErrorResponse::new(err)
                }
            };
            response.into_response()
        }
    }
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
        .unwrap_or(false)
}

/// Read a multipart GraphQL request into its operations and files
pub async fn process_request(
    mut multipart: Multipart,
    limits: &FileUploadOptions,
) -> Result<(Value, UploadedFiles), TrellisError> {
    let mut operations: Option<Value> = None;
    let mut map: Option<BTreeMap<String, Vec<String>>> = None;
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "operations" => {
                if operations.is_some() {
                    return Err(TrellisError::upload(
                        400,
                        "Duplicate 'operations' multipart field.",
                    ));
                }
                let text = read_text(field, limits.max_field_size).await?;
                operations = Some(serde_json::from_str(&text).map_err(|_| {
                    TrellisError::upload(400, "Invalid JSON in the 'operations' multipart field.")
                })?);
            }
            "map" => {
                if operations.is_none() {
                    return Err(TrellisError::upload(
                        400,
                        "Misordered multipart fields; 'map' should follow 'operations'.",
                    ));
                }
                let text = read_text(field, limits.max_field_size).await?;
                let parsed: BTreeMap<String, Vec<String>> = serde_json::from_str(&text)
                    .map_err(|_| {
                        TrellisError::upload(400, "Invalid JSON in the 'map' multipart field.")
                    })?;
                if let Some(max) = limits.max_files {
                    if parsed.len() > max {
                        return Err(TrellisError::upload(
                            413,
                            format!("{} max file uploads exceeded.", max),
                        ));
                    }
                }
                map = Some(parsed);
            }
            _ => {
                let Some(map) = &map else {
                    return Err(TrellisError::upload(
                        400,
                        "Misordered multipart fields; files should follow 'map'.",
                    ));
                };
                if !map.contains_key(&name) {
                    debug!(field = %name, "Ignoring unmapped multipart field");
                    continue;
                }
                let filename = field.file_name().map(str::to_string);
                let mimetype = field.content_type().map(str::to_string);
                let data = read_bytes(field, limits.max_file_size, "file").await?;
                files.push(UploadedFile {
                    key: name,
                    filename,
                    mimetype,
                    data,
                });
            }
        }
    }

    let mut operations = operations
        .ok_or_else(|| TrellisError::upload(400, "Missing multipart field 'operations'."))?;
    let map = map.ok_or_else(|| TrellisError::upload(400, "Missing multipart field 'map'."))?;

    for (key, paths) in &map {
        let file = files
            .iter()
            .find(|file| &file.key == key)
            .ok_or_else(|| TrellisError::upload(400, format!("File missing in the request: {}.", key)))?;
        let descriptor = serde_json::to_value(file.descriptor())?;
        for path in paths {
            set_path(&mut operations, path, descriptor.clone())?;
        }
    }

    Ok((operations, UploadedFiles(files)))
}

async fn read_text(field: Field<'_>, limit: usize) -> Result<String, TrellisError> {
    let bytes = read_bytes(field, Some(limit), "field").await?;
    String::from_utf8(bytes)
        .map_err(|_| TrellisError::upload(400, "Multipart field is not valid UTF-8."))
}

async fn read_bytes(
    mut field: Field<'_>,
    limit: Option<usize>,
    kind: &str,
) -> Result<Vec<u8>, TrellisError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if let Some(limit) = limit {
            if data.len() + chunk.len() > limit {
                return Err(TrellisError::upload(
                    413,
                    format!("The max {} size ({} bytes) was exceeded.", kind, limit),
                ));
            }
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

fn multipart_error(err: MultipartError) -> TrellisError {
    let status = err.status();
    TrellisError::Upload {
        status: status.as_u16(),
        expose: status.is_client_error(),
        message: err.body_text(),
    }
}

/// Replace the value at a dotted `path` such as `variables.files.0`
fn set_path(target: &mut Value, path: &str, replacement: Value) -> Result<(), TrellisError> {
    let invalid = || {
        TrellisError::upload(
            400,
            format!("Invalid object path for the 'map' multipart field entry: {}.", path),
        )
    };

    let mut current = target;
    for segment in path.split('.') {
        current = match current {
            Value::Object(object) => object.get_mut(segment).ok_or_else(invalid)?,
            Value::Array(items) => {
                let index: usize = segment.parse().map_err(|_| invalid())?;
                items.get_mut(index).ok_or_else(invalid)?
            }
            _ => return Err(invalid()),
        };
    }
    *current = replacement;
    Ok(())
}
