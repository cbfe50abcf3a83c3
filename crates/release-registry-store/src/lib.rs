//! File-backed storage for the Release Registry
//!
//! The registry is a read-only tree of JSON files. This crate turns
//! identifiers into paths below the registry root and reads the records
//! behind them.

pub mod error;
pub mod fs;
pub mod repository;

#[cfg(any(test, feature = "testing"))]
pub mod fixtures;

// Re-exports for convenience
pub use error::{StoreError, StoreResult};
pub use fs::FileRegistryStore;
pub use repository::RegistryStore;
