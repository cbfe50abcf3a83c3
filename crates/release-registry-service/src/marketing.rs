//! Marketing slug service
//!
//! Short, stable slugs used on marketing pages. Each slug names an SDK, a
//! package or an integration of either.

use async_trait::async_trait;
use release_registry_core::{MarketingSlug, PackageEntry, SlugKind, LATEST};
use release_registry_store::RegistryStore;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::dto::{ResolvedSlug, SlugList, SlugTarget};
use crate::error::{ServiceError, ServiceResult};
use crate::packages::PackageService;
use crate::sdks::SdkService;

/// Trait for marketing slug operations
#[async_trait]
pub trait MarketingService: Send + Sync {
    /// All slug names, sorted
    async fn list_slugs(&self) -> ServiceResult<SlugList>;

    /// A slug's definition and resolved target
    async fn resolve_slug(&self, slug: &str) -> ServiceResult<ResolvedSlug>;
}

/// Default implementation of MarketingService
pub struct DefaultMarketingService {
    store: Arc<dyn RegistryStore>,
    sdks: Arc<dyn SdkService>,
    packages: Arc<dyn PackageService>,
}

impl DefaultMarketingService {
    /// Create a new marketing service
    pub fn new(
        store: Arc<dyn RegistryStore>,
        sdks: Arc<dyn SdkService>,
        packages: Arc<dyn PackageService>,
    ) -> Self {
        Self {
            store,
            sdks,
            packages,
        }
    }

    async fn latest_sdk(&self, sdk_id: &str) -> Option<PackageEntry> {
        self.sdks
            .get_sdk(sdk_id, LATEST)
            .await
            .map_err(|e| debug!(sdk = sdk_id, "Slug target does not resolve: {}", e))
            .ok()
    }

    async fn latest_package(&self, canonical: &str) -> Option<PackageEntry> {
        self.packages
            .get_package(canonical, LATEST)
            .await
            .map_err(|e| debug!(canonical, "Slug target does not resolve: {}", e))
            .ok()
    }

    async fn resolve_target(&self, definition: &MarketingSlug) -> Option<SlugTarget> {
        match definition.kind() {
            SlugKind::Sdk => self
                .latest_sdk(definition.target()?)
                .await
                .map(SlugTarget::Package),
            SlugKind::Package => self
                .latest_package(definition.target()?)
                .await
                .map(SlugTarget::Package),
            SlugKind::Integration => {
                let package = if let Some(sdk) = definition.sdk() {
                    self.latest_sdk(sdk).await
                } else if let Some(canonical) = definition.package() {
                    self.latest_package(canonical).await
                } else {
                    None
                }?;
                Some(SlugTarget::Integration {
                    package,
                    integration: definition.integration(),
                })
            }
            SlugKind::Other => None,
        }
    }
}

#[async_trait]
impl MarketingService for DefaultMarketingService {
    async fn list_slugs(&self) -> ServiceResult<SlugList> {
        Ok(SlugList {
            slugs: self.store.marketing_slugs().keys().cloned().collect(),
        })
    }

    #[instrument(skip(self))]
    async fn resolve_slug(&self, slug: &str) -> ServiceResult<ResolvedSlug> {
        let definition = self
            .store
            .marketing_slugs()
            .get(slug)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("Marketing slug {}", slug)))?;

        let target = self.resolve_target(&definition).await;
        Ok(ResolvedSlug { definition, target })
    }
}
