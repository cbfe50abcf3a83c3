//! App service
//!
//! Application release records and download resolution.

use async_trait::async_trait;
use release_registry_core::{find_download_url, make_digest_from_map, url_checksums, AppEntry, LATEST};
use release_registry_store::{RegistryStore, StoreError};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::dto::{AppList, DownloadRequest, DownloadTarget};
use crate::error::{ServiceError, ServiceResult};

/// Trait for application operations
#[async_trait]
pub trait AppService: Send + Sync {
    /// Latest record of every application, keyed by app id
    async fn list_apps(&self) -> ServiceResult<AppList>;

    /// One version record of an application
    async fn get_app(&self, app_id: &str, version: &str) -> ServiceResult<AppEntry>;

    /// Resolve a download request to a URL and `Digest` header value.
    ///
    /// Fails with `NotFound` if the app version does not exist, with
    /// `InvalidInput` if a query parameter is missing, and with `NotFound`
    /// again if no file matches.
    async fn resolve_download(
        &self,
        app_id: &str,
        version: &str,
        request: &DownloadRequest,
    ) -> ServiceResult<DownloadTarget>;
}

/// Default implementation of AppService
pub struct DefaultAppService {
    store: Arc<dyn RegistryStore>,
}

impl DefaultAppService {
    /// Create a new app service
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AppService for DefaultAppService {
    #[instrument(skip(self))]
    async fn list_apps(&self) -> ServiceResult<AppList> {
        let ids = match self.store.app_ids().await {
            Ok(ids) => ids,
            Err(StoreError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(ServiceError::from_store(e, "App index")),
        };

        let mut apps = AppList::new();
        for id in ids {
            match self.store.read_app(&id, LATEST).await {
                Ok(app) => {
                    apps.insert(id, app);
                }
                Err(e) => warn!(app = %id, "Skipping app: {}", e),
            }
        }

        debug!(count = apps.len(), "Listed apps");
        Ok(apps)
    }

    #[instrument(skip(self))]
    async fn get_app(&self, app_id: &str, version: &str) -> ServiceResult<AppEntry> {
        self.store
            .read_app(app_id, version)
            .await
            .map_err(|e| ServiceError::from_store(e, format!("App {}@{}", app_id, version)))
    }

    #[instrument(skip(self))]
    async fn resolve_download(
        &self,
        app_id: &str,
        version: &str,
        request: &DownloadRequest,
    ) -> ServiceResult<DownloadTarget> {
        let app = self.get_app(app_id, version).await?;

        let (Some(package), Some(arch), Some(platform)) = (
            non_empty(&request.package),
            non_empty(&request.arch),
            non_empty(&request.platform),
        ) else {
            return Err(ServiceError::InvalidInput(
                "Missing required query parameters".to_string(),
            ));
        };

        let url = find_download_url(&app, package, arch, platform).ok_or_else(|| {
            ServiceError::NotFound(format!(
                "Download URL not found for {} {} {} in {}@{}",
                package, platform, arch, app_id, version
            ))
        })?;

        let digest = make_digest_from_map(url_checksums(&app, url));
        debug!(url, digest = %digest, "Resolved download");

        Ok(DownloadTarget {
            url: url.to_string(),
            digest: (!digest.is_empty()).then_some(digest),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
