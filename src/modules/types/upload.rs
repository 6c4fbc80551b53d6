//! Uploaded file types for multipart GraphQL requests

use serde::{Deserialize, Serialize};

/// A file received in a multipart GraphQL request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Multipart field name, which is also the key used in the `map` field
    pub key: String,
    pub filename: Option<String>,
    pub mimetype: Option<String>,
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Describe this file for substitution into the operations document
    pub fn descriptor(&self) -> UploadDescriptor {
        UploadDescriptor {
            upload: self.key.clone(),
            filename: self.filename.clone(),
            mimetype: self.mimetype.clone(),
            size: self.data.len(),
        }
    }
}

/// Placeholder value substituted for a file inside the operations document
///
/// The file contents stay out of the JSON payload; the `__upload` key
/// points back into [`UploadedFiles`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadDescriptor {
    #[serde(rename = "__upload")]
    pub upload: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    pub size: usize,
}

/// All files received with one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedFiles(pub Vec<UploadedFile>);

impl UploadedFiles {
    /// Find a file by its multipart key
    pub fn get(&self, key: &str) -> Option<&UploadedFile> {
        self.0.iter().find(|f| f.key == key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(key: &str) -> UploadedFile {
        UploadedFile {
            key: key.to_string(),
            filename: Some("a.txt".to_string()),
            mimetype: Some("text/plain".to_string()),
            data: b"hello".to_vec(),
        }
    }

    #[test]
    fn test_descriptor_serializes_upload_key() {
        let value = serde_json::to_value(file("0").descriptor()).unwrap();
        assert_eq!(value["__upload"], "0");
        assert_eq!(value["size"], 5);
        assert_eq!(value["filename"], "a.txt");
    }

    #[test]
    fn test_uploaded_files_lookup() {
        let files = UploadedFiles(vec![file("0"), file("1")]);
        assert_eq!(files.len(), 2);
        assert!(files.get("1").is_some());
        assert!(files.get("2").is_none());
    }
}
