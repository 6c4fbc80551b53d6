//! CORS policy translation

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer, ExposeHeaders};
use trellis_core::{CorsOrigin, CorsPolicy, TrellisError};

/// Build a `CorsLayer` enforcing `policy`
///
/// Combinations browsers reject (credentials with a wildcard origin) are
/// reported here instead of panicking when the layer is applied.
pub fn cors_layer(policy: &CorsPolicy) -> Result<CorsLayer, TrellisError> {
    let origin = match &policy.origin {
        CorsOrigin::Mirror => AllowOrigin::mirror_request(),
        CorsOrigin::Any => {
            if policy.credentials {
                return Err(TrellisError::Config(
                    "CORS credentials cannot be combined with a wildcard origin".to_string(),
                ));
            }
            AllowOrigin::any()
        }
        CorsOrigin::List(origins) => {
            if origins.is_empty() {
                return Err(TrellisError::Config(
                    "CORS origin list must not be empty".to_string(),
                ));
            }
            let origins = origins
                .iter()
                .map(|origin| {
                    HeaderValue::from_str(origin).map_err(|_| {
                        TrellisError::Config(format!("Invalid CORS origin: {}", origin))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            AllowOrigin::list(origins)
        }
    };

    let methods = policy
        .methods
        .iter()
        .map(|method| {
            Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .map_err(|_| TrellisError::Config(format!("Invalid CORS method: {}", method)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut layer = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::list(methods));

    layer = match &policy.allowed_headers {
        None => layer.allow_headers(AllowHeaders::mirror_request()),
        Some(headers) => layer.allow_headers(AllowHeaders::list(header_names(headers)?)),
    };

    if !policy.exposed_headers.is_empty() {
        layer = layer.expose_headers(ExposeHeaders::list(header_names(
            &policy.exposed_headers,
        )?));
    }
    if policy.credentials {
        layer = layer.allow_credentials(true);
    }
    if let Some(secs) = policy.max_age_secs {
        layer = layer.max_age(Duration::from_secs(secs));
    }

    Ok(layer)
}

fn header_names(names: &[String]) -> Result<Vec<HeaderName>, TrellisError> {
    names
        .iter()
        .map(|name| {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| TrellisError::Config(format!("Invalid CORS header: {}", name)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_builds() {
        assert!(cors_layer(&CorsPolicy::default()).is_ok());
    }

    #[test]
    fn test_credentials_with_wildcard_rejected() {
        let policy = CorsPolicy {
            origin: CorsOrigin::Any,
            credentials: true,
            ..CorsPolicy::default()
        };
        assert!(matches!(cors_layer(&policy), Err(TrellisError::Config(_))));
    }

    #[test]
    fn test_invalid_header_rejected() {
        let policy = CorsPolicy {
            allowed_headers: Some(vec!["bad header".to_string()]),
            ..CorsPolicy::default()
        };
        assert!(cors_layer(&policy).is_err());
    }
}
