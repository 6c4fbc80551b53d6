//! Deployment environment marker

/// Environment variable consulted for the deployment environment
pub const ENVIRONMENT_VAR: &str = "TRELLIS_ENV";

/// Deployment environment, read from `TRELLIS_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Read the environment from `TRELLIS_ENV`, defaulting to development
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(ENVIRONMENT_VAR).ok().as_deref())
    }

    pub fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("production") || v.eq_ignore_ascii_case("prod") => {
                Environment::Production
            }
            _ => Environment::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_value() {
        assert_eq!(Environment::from_value(None), Environment::Development);
        assert_eq!(Environment::from_value(Some("production")), Environment::Production);
        assert_eq!(Environment::from_value(Some(" PROD ")), Environment::Production);
        assert_eq!(Environment::from_value(Some("staging")), Environment::Development);
    }
}
