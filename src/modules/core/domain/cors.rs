//! CORS policy configuration

use serde::{Deserialize, Deserializer};

use super::Toggle;

/// CORS setting for the GraphQL path
pub type CorsConfig = Toggle<CorsPolicy>;

/// Methods allowed when a policy does not list its own
pub const DEFAULT_CORS_METHODS: [&str; 6] = ["GET", "HEAD", "PUT", "POST", "DELETE", "PATCH"];

/// Which origins may access the GraphQL path
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CorsOrigin {
    /// Reflect the request's `Origin` header
    #[default]
    Mirror,
    /// `Access-Control-Allow-Origin: *`
    Any,
    /// Only the listed origins
    List(Vec<String>),
}

impl<'de> Deserialize<'de> for CorsOrigin {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawOrigin {
            One(String),
            Many(Vec<String>),
        }

        Ok(match RawOrigin::deserialize(deserializer)? {
            RawOrigin::One(origin) if origin == "*" => CorsOrigin::Any,
            RawOrigin::One(origin) if origin.eq_ignore_ascii_case("mirror") => CorsOrigin::Mirror,
            RawOrigin::One(origin) => CorsOrigin::List(vec![origin]),
            RawOrigin::Many(origins) => CorsOrigin::List(origins),
        })
    }
}

/// Explicit CORS policy
///
/// The default mirrors the request origin and requested headers and allows
/// the common REST methods without credentials.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CorsPolicy {
    pub origin: CorsOrigin,

    /// Allowed methods
    pub methods: Vec<String>,

    /// Allowed request headers; `None` reflects `Access-Control-Request-Headers`
    pub allowed_headers: Option<Vec<String>>,

    /// Response headers exposed to the browser
    pub exposed_headers: Vec<String>,

    /// Send `Access-Control-Allow-Credentials: true`
    pub credentials: bool,

    /// Preflight cache lifetime in seconds
    pub max_age_secs: Option<u64>,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            origin: CorsOrigin::Mirror,
            methods: DEFAULT_CORS_METHODS.iter().map(|m| m.to_string()).collect(),
            allowed_headers: None,
            exposed_headers: Vec::new(),
            credentials: false,
            max_age_secs: None,
        }
    }
}

impl CorsPolicy {
    /// Policy restricted to the given origins
    pub fn with_origins<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            origin: CorsOrigin::List(origins.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn with_credentials(mut self, credentials: bool) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_max_age(mut self, secs: u64) -> Self {
        self.max_age_secs = Some(secs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = CorsPolicy::default();
        assert_eq!(policy.origin, CorsOrigin::Mirror);
        assert_eq!(policy.methods.len(), 6);
        assert!(!policy.credentials);
    }

    #[test]
    fn test_origin_forms() {
        let any: CorsOrigin = serde_json::from_str(r#""*""#).unwrap();
        assert_eq!(any, CorsOrigin::Any);

        let one: CorsOrigin = serde_json::from_str(r#""https://a.example""#).unwrap();
        assert_eq!(one, CorsOrigin::List(vec!["https://a.example".to_string()]));

        let many: CorsOrigin = serde_json::from_str(r#"["https://a", "https://b"]"#).unwrap();
        assert_eq!(many, CorsOrigin::List(vec!["https://a".into(), "https://b".into()]));
    }

    #[test]
    fn test_cors_config_from_object() {
        let config: CorsConfig =
            serde_json::from_str(r#"{"origin": "https://a.example", "credentials": true}"#)
                .unwrap();
        match config {
            Toggle::Custom(policy) => {
                assert!(policy.credentials);
                assert_eq!(policy.methods.len(), 6);
            }
            other => panic!("expected custom policy, got {:?}", other),
        }
    }
}
