//! Package service
//!
//! Lookups of package records by canonical and version, plus the package
//! listing.

use async_trait::async_trait;
use release_registry_core::{sort_versions, Canonical, PackageEntry, LATEST};
use release_registry_store::RegistryStore;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::dto::{PackageList, VersionsResponse};
use crate::error::{ServiceError, ServiceResult};

/// Trait for package operations
#[async_trait]
pub trait PackageService: Send + Sync {
    /// Latest record of every package, keyed by the record's own canonical.
    ///
    /// Packages that fail to load are skipped unless `strict` is set, in which
    /// case the first failure is returned.
    async fn list_packages(&self, strict: bool) -> ServiceResult<PackageList>;

    /// One version record (`latest` for the alias)
    async fn get_package(&self, canonical: &str, version: &str) -> ServiceResult<PackageEntry>;

    /// Latest record and all versions of a package
    async fn get_package_versions(&self, canonical: &str) -> ServiceResult<VersionsResponse>;
}

/// Default implementation of PackageService
pub struct DefaultPackageService {
    store: Arc<dyn RegistryStore>,
}

impl DefaultPackageService {
    /// Create a new package service
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self { store }
    }

    /// Latest record and sorted versions of an already parsed canonical
    pub(crate) async fn versions_of(
        store: &dyn RegistryStore,
        canonical: &Canonical,
    ) -> ServiceResult<VersionsResponse> {
        let subject = || format!("Package {}", canonical);
        let latest = store
            .read_package(canonical, LATEST)
            .await
            .map_err(|e| ServiceError::from_store(e, subject()))?;
        let versions = store
            .package_versions(canonical)
            .await
            .map_err(|e| ServiceError::from_store(e, subject()))?;
        let versions = sort_versions(versions);
        Ok(VersionsResponse { latest, versions })
    }
}

#[async_trait]
impl PackageService for DefaultPackageService {
    #[instrument(skip(self))]
    async fn list_packages(&self, strict: bool) -> ServiceResult<PackageList> {
        let mut packages = PackageList::new();

        for canonical in self.store.package_canonicals() {
            match self.store.read_package(canonical, LATEST).await {
                Ok(entry) => {
                    packages.insert(entry.canonical().to_string(), entry);
                }
                Err(e) if strict => {
                    warn!(canonical = %canonical, "Strict listing failed: {}", e);
                    return Err(ServiceError::Inconsistent(format!(
                        "Package {} cannot be read",
                        canonical
                    )));
                }
                Err(e) => warn!(canonical = %canonical, "Failed to read package: {}", e),
            }
        }

        debug!(count = packages.len(), "Listed packages");
        Ok(packages)
    }

    #[instrument(skip(self))]
    async fn get_package(&self, canonical: &str, version: &str) -> ServiceResult<PackageEntry> {
        let canonical = Canonical::parse(canonical)?;
        self.store
            .read_package(&canonical, version)
            .await
            .map_err(|e| ServiceError::from_store(e, format!("Package {}@{}", canonical, version)))
    }

    #[instrument(skip(self))]
    async fn get_package_versions(&self, canonical: &str) -> ServiceResult<VersionsResponse> {
        let canonical = Canonical::parse(canonical)?;
        Self::versions_of(self.store.as_ref(), &canonical).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use release_registry_store::fixtures::sample_registry;
    use release_registry_store::FileRegistryStore;

    async fn service() -> (tempfile::TempDir, DefaultPackageService) {
        let dir = sample_registry();
        let store = FileRegistryStore::open(dir.path()).await.unwrap();
        (dir, DefaultPackageService::new(Arc::new(store)))
    }

    #[tokio::test]
    async fn test_list_packages_skips_broken() {
        let (_dir, service) = service().await;
        let packages = service.list_packages(false).await.unwrap();

        let keys: Vec<&str> = packages.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["npm:@sentry/node", "npm:@sentry/react", "pypi:sentry-sdk"]);
        assert_eq!(packages["pypi:sentry-sdk"].version(), "1.10.0");
    }

    #[tokio::test]
    async fn test_list_packages_strict_fails_on_broken() {
        let (dir, service) = service().await;
        let err = service.list_packages(true).await.unwrap_err();
        assert!(!err.to_string().contains(dir.path().to_str().unwrap()));
        assert!(matches!(err, ServiceError::Inconsistent(_)));
    }

    #[tokio::test]
    async fn test_get_package_accepts_both_separators() {
        let (_dir, service) = service().await;
        let slash = service.get_package("npm:@sentry/react", "7.0.0").await.unwrap();
        let colon = service.get_package("npm:@sentry:react", "7.0.0").await.unwrap();
        assert_eq!(slash, colon);
        assert_eq!(slash.version(), "7.0.0");
    }

    #[tokio::test]
    async fn test_get_package_not_found() {
        let (dir, service) = service().await;
        let err = service.get_package("npm:@sentry/react", "0.0.0").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!err.to_string().contains(dir.path().to_str().unwrap()));
        assert!(err.to_string().contains("npm:@sentry/react@0.0.0"));
        assert!(service.get_package("no-registry", LATEST).await.unwrap_err().is_not_found());
        assert!(service.get_package("npm:../../apps", LATEST).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_get_package_versions_sorted() {
        let (_dir, service) = service().await;
        let versions = service.get_package_versions("pypi:sentry-sdk").await.unwrap();
        assert_eq!(versions.latest.version(), "1.10.0");
        assert_eq!(versions.versions, vec!["1.0.0", "1.9.0", "1.10.0"]);
    }

    #[tokio::test]
    async fn test_get_package_versions_unknown() {
        let (_dir, service) = service().await;
        let err = service.get_package_versions("pypi:unknown").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
