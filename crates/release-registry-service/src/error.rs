//! Service-layer error types
//!
//! Maps domain and store errors to the handful of outcomes a caller has to
//! tell apart.

use release_registry_core::RegistryError;
use release_registry_store::StoreError;
use std::fmt;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Result type alias for service operations
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Service-layer error types
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Package, SDK, app, slug or download not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A record exists but could not be parsed
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    /// Strict listing hit an entry that does not resolve
    #[error("Registry inconsistency: {0}")]
    Inconsistent(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal service error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }

    /// Map a store failure while loading `subject`, e.g. `Package npm:x@1.0.0`
    ///
    /// Store errors name files under the registry root. Those go to the log
    /// only; the returned message is built from `subject`.
    pub fn from_store(err: StoreError, subject: impl fmt::Display) -> Self {
        match &err {
            StoreError::NotFound(_) | StoreError::InvalidPath(_) => {
                debug!(error = %err, "{} not found", subject);
                ServiceError::NotFound(format!("{} not found", subject))
            }
            StoreError::Parse { .. } => {
                warn!(error = %err, "{} is not a valid record", subject);
                ServiceError::CorruptRecord(format!("{} could not be read", subject))
            }
            StoreError::InvalidRoot(_) => {
                error!(error = %err, "Registry root unavailable");
                ServiceError::Internal("Registry root is unavailable".to_string())
            }
            StoreError::Io { .. } => {
                error!(error = %err, "Failed to load {}", subject);
                ServiceError::Storage(format!("{} could not be loaded", subject))
            }
        }
    }
}

impl From<RegistryError> for ServiceError {
    fn from(err: RegistryError) -> Self {
        match err {
            // Identifiers come from request paths, so a malformed one simply names nothing
            RegistryError::InvalidCanonical(_) | RegistryError::InvalidPathComponent(_) => {
                ServiceError::NotFound(err.to_string())
            }
            _ => ServiceError::Internal(err.to_string()),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::from_store(err, "Registry entry")
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Internal(format!("Serialization error: {}", err))
    }
}
