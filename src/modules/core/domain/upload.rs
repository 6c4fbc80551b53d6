//! File upload limits

use serde::Deserialize;

use super::Toggle;

/// Upload setting for the GraphQL path
pub type UploadsConfig = Toggle<FileUploadOptions>;

/// Limits applied while parsing multipart GraphQL requests
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileUploadOptions {
    /// Maximum size of the `operations` and `map` fields in bytes
    pub max_field_size: usize,

    /// Maximum size of a single file in bytes
    pub max_file_size: Option<usize>,

    /// Maximum number of files per request
    pub max_files: Option<usize>,
}

impl Default for FileUploadOptions {
    fn default() -> Self {
        Self {
            max_field_size: 1_000_000,
            max_file_size: None,
            max_files: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_defaults() {
        let options = FileUploadOptions::default();
        assert_eq!(options.max_field_size, 1_000_000);
        assert!(options.max_file_size.is_none());
        assert!(options.max_files.is_none());
    }

    #[test]
    fn test_uploads_config_disabled() {
        let config: UploadsConfig = serde_json::from_str("false").unwrap();
        assert!(config.resolve().is_none());
    }
}
