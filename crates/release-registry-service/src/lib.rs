//! Service layer for the Release Registry
//!
//! This crate sits between the HTTP layer and the store. It resolves SDK
//! links, sorts versions, matches download URLs and assembles the response
//! shapes the API serves.
//!
//! # Architecture
//!
//! - **PackageService**: package records and version listings
//! - **SdkService**: SDK ids resolved to package records
//! - **AppService**: application releases and download resolution
//! - **MarketingService**: marketing slugs and their targets
//! - **LambdaLayerService**: AWS Lambda layer listing
//! - **SnapshotBuilder**: renders all of the above into a static tree
//!
//! # Example
//!
//! ```rust,no_run
//! use release_registry_service::ServiceRegistry;
//! use release_registry_store::FileRegistryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileRegistryStore::open("..").await?;
//! let services = ServiceRegistry::new(Arc::new(store));
//! let packages = services.packages().list_packages(false).await?;
//! # Ok(())
//! # }
//! ```

pub mod apps;
pub mod dto;
pub mod error;
pub mod layers;
pub mod marketing;
pub mod packages;
pub mod sdks;
pub mod snapshot;

// Re-export main types for convenience
pub use dto::*;
pub use error::{ServiceError, ServiceResult};

// Re-export service traits and implementations
pub use apps::{AppService, DefaultAppService};
pub use layers::{DefaultLambdaLayerService, LambdaLayerService};
pub use marketing::{DefaultMarketingService, MarketingService};
pub use packages::{DefaultPackageService, PackageService};
pub use sdks::{DefaultSdkService, SdkService};
pub use snapshot::SnapshotBuilder;

use release_registry_store::RegistryStore;
use std::sync::Arc;

/// Service registry that holds all service instances
#[derive(Clone)]
pub struct ServiceRegistry {
    /// Underlying store, shared by all services
    pub store: Arc<dyn RegistryStore>,
    /// Package service
    pub packages: Arc<dyn PackageService>,
    /// SDK service
    pub sdks: Arc<dyn SdkService>,
    /// App service
    pub apps: Arc<dyn AppService>,
    /// Marketing slug service
    pub marketing: Arc<dyn MarketingService>,
    /// Lambda layer service
    pub layers: Arc<dyn LambdaLayerService>,
}

impl ServiceRegistry {
    /// Create a new service registry with default implementations
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        let packages: Arc<dyn PackageService> = Arc::new(DefaultPackageService::new(store.clone()));
        let sdks: Arc<dyn SdkService> = Arc::new(DefaultSdkService::new(store.clone()));
        let apps = Arc::new(DefaultAppService::new(store.clone()));
        let layers = Arc::new(DefaultLambdaLayerService::new(store.clone()));
        let marketing = Arc::new(DefaultMarketingService::new(
            store.clone(),
            sdks.clone(),
            packages.clone(),
        ));

        Self {
            store,
            packages,
            sdks,
            apps,
            marketing,
            layers,
        }
    }

    /// Get the package service
    pub fn packages(&self) -> &Arc<dyn PackageService> {
        &self.packages
    }

    /// Get the SDK service
    pub fn sdks(&self) -> &Arc<dyn SdkService> {
        &self.sdks
    }

    /// Get the app service
    pub fn apps(&self) -> &Arc<dyn AppService> {
        &self.apps
    }

    /// Get the marketing slug service
    pub fn marketing(&self) -> &Arc<dyn MarketingService> {
        &self.marketing
    }

    /// Get the Lambda layer service
    pub fn layers(&self) -> &Arc<dyn LambdaLayerService> {
        &self.layers
    }

    /// Check that the store is still reachable
    pub async fn health(&self) -> ServiceResult<()> {
        self.store
            .health()
            .await
            .map_err(|e| ServiceError::from_store(e, "Registry root"))
    }

    /// A snapshot builder reading through these services
    pub fn snapshot(&self) -> SnapshotBuilder {
        SnapshotBuilder::new(self.clone())
    }
}
