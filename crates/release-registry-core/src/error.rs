//! Error types for the Release Registry domain

use thiserror::Error;

/// Result type alias for domain operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Main error type for domain operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Canonical identifier is malformed
    #[error("Invalid canonical: {0}")]
    InvalidCanonical(String),

    /// A path component would escape the registry root or is empty
    #[error("Invalid path component: {0:?}")]
    InvalidPathComponent(String),

    /// Checksum value could not be decoded
    #[error("Invalid checksum for {algorithm}: {message}")]
    InvalidChecksum { algorithm: String, message: String },

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::SerializationError(err.to_string())
    }
}
