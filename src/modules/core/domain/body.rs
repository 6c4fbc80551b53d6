//! Request body parser configuration

use serde::Deserialize;

use super::Toggle;

/// Body parser setting for the GraphQL path
pub type BodyParserConfig = Toggle<BodyParserOptions>;

/// Body encodings the parser understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    Json,
    Form,
    Text,
}

/// Body parser limits and accepted encodings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BodyParserOptions {
    /// Encodings to parse; other content types leave the body empty
    pub enable_types: Vec<BodyType>,

    /// Maximum JSON body size in bytes
    pub json_limit: usize,

    /// Maximum urlencoded form body size in bytes
    pub form_limit: usize,

    /// Maximum text body size in bytes
    pub text_limit: usize,

    /// Only accept JSON objects and arrays at the top level
    pub strict: bool,
}

impl Default for BodyParserOptions {
    fn default() -> Self {
        Self {
            enable_types: vec![BodyType::Json, BodyType::Form],
            json_limit: 1024 * 1024,
            form_limit: 56 * 1024,
            text_limit: 1024 * 1024,
            strict: true,
        }
    }
}

impl BodyParserOptions {
    pub fn enables(&self, ty: BodyType) -> bool {
        self.enable_types.contains(&ty)
    }

    /// Size limit for the given encoding
    pub fn limit_for(&self, ty: BodyType) -> usize {
        match ty {
            BodyType::Json => self.json_limit,
            BodyType::Form => self.form_limit,
            BodyType::Text => self.text_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_parser_defaults() {
        let options = BodyParserOptions::default();
        assert!(options.enables(BodyType::Json));
        assert!(options.enables(BodyType::Form));
        assert!(!options.enables(BodyType::Text));
        assert_eq!(options.limit_for(BodyType::Form), 57344);
        assert!(options.strict);
    }

    #[test]
    fn test_body_parser_partial_override() {
        let options: BodyParserOptions =
            serde_json::from_str(r#"{"json_limit": 10, "enable_types": ["json", "text"]}"#)
                .unwrap();
        assert_eq!(options.json_limit, 10);
        assert!(options.enables(BodyType::Text));
        assert_eq!(options.form_limit, 57344);
    }
}
