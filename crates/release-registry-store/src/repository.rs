//! Store trait abstraction
//!
//! The service layer only talks to [`RegistryStore`], so the file-backed
//! implementation can be swapped for an in-memory one in tests or for a
//! pre-built snapshot.

use async_trait::async_trait;
use release_registry_core::{AppEntry, Canonical, LambdaLayerEntry, MarketingSlug, PackageEntry};
use std::collections::BTreeMap;

use crate::error::StoreResult;

/// Read access to the registry's records
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Every package canonical known to the store
    fn package_canonicals(&self) -> &[Canonical];

    /// Read one version record of a package (`latest` for the alias)
    async fn read_package(&self, canonical: &Canonical, version: &str) -> StoreResult<PackageEntry>;

    /// The `version` field of every non-latest record of a package, unsorted
    async fn package_versions(&self, canonical: &Canonical) -> StoreResult<Vec<String>>;

    /// Ids of all SDK links
    async fn sdk_ids(&self) -> StoreResult<Vec<String>>;

    /// Canonical of the package an SDK version record points to
    async fn read_sdk_link(&self, sdk_id: &str, version: &str) -> StoreResult<Canonical>;

    /// Ids of all applications
    async fn app_ids(&self) -> StoreResult<Vec<String>>;

    /// Read one version record of an application
    async fn read_app(&self, app_id: &str, version: &str) -> StoreResult<AppEntry>;

    /// Version names of an application's records, taken from file names
    async fn app_versions(&self, app_id: &str) -> StoreResult<Vec<String>>;

    /// Names of all Lambda layer runtime directories
    async fn lambda_layer_runtimes(&self) -> StoreResult<Vec<String>>;

    /// Read the latest layer record of a runtime
    async fn read_lambda_layer(&self, runtime: &str) -> StoreResult<LambdaLayerEntry>;

    /// Marketing slug definitions, keyed and ordered by slug
    fn marketing_slugs(&self) -> &BTreeMap<String, MarketingSlug>;

    /// Check that the backing storage is still reachable
    async fn health(&self) -> StoreResult<()>;
}
