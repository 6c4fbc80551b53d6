//! Environment variable substitution
//!
//! Placeholders take the form `{{ env.NAME }}` or `{{ env.NAME | fallback }}`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use trellis_core::TrellisError;

/// Regex pattern for environment placeholders with an optional fallback
static ENV_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*env\.([A-Za-z_][A-Za-z0-9_]*)\s*(?:\|\s*([^}]*?)\s*)?\}\}").unwrap()
});

/// Environment variable substitutor
pub struct EnvSubstitutor {
    /// Whether to fail on missing variables that have no fallback
    strict: bool,
}

impl EnvSubstitutor {
    /// Create a new substitutor with strict mode (fails on missing vars)
    pub fn new() -> Self {
        Self { strict: true }
    }

    /// Create a new substitutor with lenient mode (leaves placeholders for missing vars)
    pub fn lenient() -> Self {
        Self { strict: false }
    }

    /// Substitute environment variables in the given content
    pub fn substitute(&self, content: &str) -> Result<String, TrellisError> {
        // .env is optional
        let _ = dotenvy::dotenv();

        let mut missing: Vec<String> = Vec::new();
        let result = ENV_PATTERN.replace_all(content, |cap: &Captures<'_>| {
            let name = &cap[1];
            match (std::env::var(name), cap.get(2)) {
                (Ok(value), _) => value,
                (Err(_), Some(fallback)) => fallback.as_str().to_string(),
                (Err(_), None) => {
                    if self.strict {
                        missing.push(name.to_string());
                    }
                    cap[0].to_string()
                }
            }
        });

        if !missing.is_empty() {
            return Err(TrellisError::EnvVarNotFound(missing.join(", ")));
        }

        Ok(result.into_owned())
    }

    /// Check if a string contains environment variable placeholders
    pub fn has_placeholders(content: &str) -> bool {
        ENV_PATTERN.is_match(content)
    }

    /// Extract all environment variable names from a string
    pub fn extract_var_names(content: &str) -> Vec<String> {
        ENV_PATTERN
            .captures_iter(content)
            .map(|cap| cap[1].to_string())
            .collect()
    }
}

impl Default for EnvSubstitutor {
    fn default() -> Self {
        Self::new()
    }
}
