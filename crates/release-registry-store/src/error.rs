//! Store-specific error types
//!
//! Every failure to produce a record from the registry tree maps to one of
//! these variants. Only [`StoreError::NotFound`] and
//! [`StoreError::InvalidPath`] are expected during normal operation.

use std::path::Path;
use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store-specific errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// File or directory does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// User-supplied identifier is not a valid path component
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Record file exists but is not valid JSON or lacks required fields
    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// Registry root is missing or not a directory
    #[error("Invalid registry root: {0}")]
    InvalidRoot(String),

    /// Any other I/O failure
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// Map an I/O error on `path`, turning `ErrorKind::NotFound` into [`StoreError::NotFound`]
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound(path.display().to_string())
        } else {
            StoreError::Io {
                path: path.display().to_string(),
                source: err,
            }
        }
    }
}

impl From<release_registry_core::RegistryError> for StoreError {
    fn from(err: release_registry_core::RegistryError) -> Self {
        StoreError::InvalidPath(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use release_registry_core::RegistryError;

    #[test]
    fn test_io_not_found_mapping() {
        let err = StoreError::from_io(
            Path::new("/tmp/missing.json"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(err.is_not_found());

        let err = StoreError::from_io(
            Path::new("/tmp/locked.json"),
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn test_domain_error_is_invalid_path() {
        let err: StoreError = RegistryError::InvalidPathComponent("..".to_string()).into();
        assert!(matches!(err, StoreError::InvalidPath(_)));
    }
}
