//! Core domain types for the Release Registry
//!
//! This crate holds the pieces of the registry that do not touch the
//! filesystem or HTTP: canonical package identifiers, the record types stored
//! on disk, download URL matching, `Digest` header composition and version
//! ordering.

pub mod canonical;
pub mod digest;
pub mod download;
pub mod entry;
pub mod error;
pub mod version;

// Re-exports for convenience
pub use canonical::{validate_path_component, Canonical, LATEST, NAMESPACE_FILE_MARKER};
pub use digest::{make_digest, make_digest_from_map, ChecksumEncoding, ChecksumKey};
pub use download::{find_download_url, url_checksums};
pub use entry::{AppEntry, AppFile, LambdaLayerEntry, MarketingSlug, PackageEntry, SlugKind};
pub use error::{RegistryError, Result};
pub use version::{compare_versions, sort_versions};
