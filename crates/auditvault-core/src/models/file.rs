//! The file selected by the user for one submission.

use std::path::{Component, Path};

use bytes::Bytes;

use crate::error::AppError;

/// Opaque binary blob plus its name. Cloning shares the underlying buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    name: String,
    content: Bytes,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read a file from disk, refusing paths that climb out with `..`.
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(AppError::Validation(format!(
                "Invalid input: {}",
                path.display()
            )));
        }

        let content = std::fs::read(path).map_err(|e| {
            AppError::Validation(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();

        Ok(Self::new(name, content))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_rejects_parent_components() {
        let err = UploadedFile::from_path(Path::new("../secret.pdf")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_from_path_missing_file_is_validation_error() {
        let err = UploadedFile::from_path(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_clone_shares_content() {
        let file = UploadedFile::new("report.pdf", b"%PDF-1.7".to_vec());
        let copy = file.clone();
        assert_eq!(copy.name(), "report.pdf");
        assert_eq!(copy.len(), 8);
        assert_eq!(file.content().as_ptr(), copy.content().as_ptr());
    }
}
