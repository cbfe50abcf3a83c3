//! SDK service
//!
//! An SDK id (e.g. `sentry.python`) is a link to a package canonical. SDK
//! lookups follow the link and return package records.

use async_trait::async_trait;
use release_registry_core::{PackageEntry, LATEST};
use release_registry_store::{RegistryStore, StoreError};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::dto::{SdkList, VersionsResponse};
use crate::error::{ServiceError, ServiceResult};
use crate::packages::DefaultPackageService;

/// Trait for SDK operations
#[async_trait]
pub trait SdkService: Send + Sync {
    /// Latest package record of every SDK, keyed by SDK id
    async fn list_sdks(&self, strict: bool) -> ServiceResult<SdkList>;

    /// Package record for an SDK version (`latest` for the alias)
    async fn get_sdk(&self, sdk_id: &str, version: &str) -> ServiceResult<PackageEntry>;

    /// Latest record and all versions of an SDK's package
    async fn get_sdk_versions(&self, sdk_id: &str) -> ServiceResult<VersionsResponse>;
}

/// Default implementation of SdkService
pub struct DefaultSdkService {
    store: Arc<dyn RegistryStore>,
}

impl DefaultSdkService {
    /// Create a new SDK service
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SdkService for DefaultSdkService {
    #[instrument(skip(self))]
    async fn list_sdks(&self, strict: bool) -> ServiceResult<SdkList> {
        let ids = match self.store.sdk_ids().await {
            Ok(ids) => ids,
            Err(StoreError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(ServiceError::from_store(e, "SDK index")),
        };

        let mut sdks = SdkList::new();
        for id in ids {
            match self.get_sdk(&id, LATEST).await {
                Ok(entry) => {
                    sdks.insert(id, entry);
                }
                Err(e) if strict => {
                    warn!(sdk = %id, "Strict listing failed: {}", e);
                    return Err(ServiceError::Inconsistent(format!(
                        "SDK {} cannot be resolved",
                        id
                    )));
                }
                Err(e) => warn!(sdk = %id, "Skipping SDK: {}", e),
            }
        }

        debug!(count = sdks.len(), "Listed SDKs");
        Ok(sdks)
    }

    #[instrument(skip(self))]
    async fn get_sdk(&self, sdk_id: &str, version: &str) -> ServiceResult<PackageEntry> {
        let subject = || format!("SDK {}@{}", sdk_id, version);
        let canonical = self
            .store
            .read_sdk_link(sdk_id, version)
            .await
            .map_err(|e| ServiceError::from_store(e, subject()))?;
        self.store
            .read_package(&canonical, version)
            .await
            .map_err(|e| ServiceError::from_store(e, subject()))
    }

    #[instrument(skip(self))]
    async fn get_sdk_versions(&self, sdk_id: &str) -> ServiceResult<VersionsResponse> {
        let canonical = self
            .store
            .read_sdk_link(sdk_id, LATEST)
            .await
            .map_err(|e| ServiceError::from_store(e, format!("SDK {}", sdk_id)))?;
        DefaultPackageService::versions_of(self.store.as_ref(), &canonical).await
    }
}
