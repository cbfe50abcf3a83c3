//! Data Transfer Objects (DTOs) for service layer
//!
//! Response shapes returned by the services and serialized as-is by the API.

use release_registry_core::{AppEntry, LambdaLayerEntry, MarketingSlug, PackageEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// Listings
// ============================================================================

/// All packages, keyed by canonical
pub type PackageList = BTreeMap<String, PackageEntry>;

/// All SDKs, keyed by SDK id, each resolved to its package's latest record
pub type SdkList = BTreeMap<String, PackageEntry>;

/// All applications, keyed by app id
pub type AppList = BTreeMap<String, AppEntry>;

/// All Lambda layers, keyed by canonical
pub type LambdaLayerList = BTreeMap<String, LambdaLayerEntry>;

// ============================================================================
// Versions
// ============================================================================

/// Latest record of a package together with all known versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionsResponse {
    /// The `latest.json` record
    pub latest: PackageEntry,

    /// Versions in ascending semver order
    pub versions: Vec<String>,
}

// ============================================================================
// Marketing slug DTOs
// ============================================================================

/// Names of all marketing slugs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlugList {
    pub slugs: Vec<String>,
}

/// What a resolved marketing slug points at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlugTarget {
    /// Integration of an SDK or package
    Integration {
        package: PackageEntry,
        integration: Value,
    },
    /// Latest record of an SDK's package or of a package
    Package(PackageEntry),
}

/// A marketing slug definition with its resolved target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSlug {
    /// Definition exactly as stored
    pub definition: MarketingSlug,

    /// Resolved target, `null` if the definition does not resolve
    pub target: Option<SlugTarget>,
}

// ============================================================================
// Download DTOs
// ============================================================================

/// Query parameters of a download request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// Package name, e.g. `sentry-cli`
    #[serde(default)]
    pub package: Option<String>,

    /// CPU architecture, e.g. `x86_64`
    #[serde(default)]
    pub arch: Option<String>,

    /// Operating system, e.g. `Linux`
    #[serde(default)]
    pub platform: Option<String>,
}

/// Where a download request redirects to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadTarget {
    /// Download URL as stored in the app record
    pub url: String,

    /// `Digest` header value, if the file has usable checksums
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

// ============================================================================
// Snapshot DTOs
// ============================================================================

/// Counts of what a snapshot build wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub packages: usize,
    pub sdks: usize,
    pub apps: usize,
    pub lambda_layers: usize,
    pub marketing_slugs: usize,
}
