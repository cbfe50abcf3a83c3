//! AWS Lambda layer service

use async_trait::async_trait;
use release_registry_store::{RegistryStore, StoreError};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::dto::LambdaLayerList;
use crate::error::{ServiceError, ServiceResult};

/// Trait for Lambda layer operations
#[async_trait]
pub trait LambdaLayerService: Send + Sync {
    /// Latest layer record of every runtime, keyed by the layer's canonical
    async fn list_layers(&self) -> ServiceResult<LambdaLayerList>;
}

/// Default implementation of LambdaLayerService
pub struct DefaultLambdaLayerService {
    store: Arc<dyn RegistryStore>,
}

impl DefaultLambdaLayerService {
    /// Create a new Lambda layer service
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LambdaLayerService for DefaultLambdaLayerService {
    #[instrument(skip(self))]
    async fn list_layers(&self) -> ServiceResult<LambdaLayerList> {
        let runtimes = match self.store.lambda_layer_runtimes().await {
            Ok(runtimes) => runtimes,
            Err(StoreError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(ServiceError::from_store(e, "Lambda layer index")),
        };

        let mut layers = LambdaLayerList::new();
        for runtime in runtimes {
            match self.store.read_lambda_layer(&runtime).await {
                Ok(layer) => {
                    layers.insert(layer.canonical().to_string(), layer);
                }
                Err(e) => warn!(runtime = %runtime, "Skipping Lambda layer: {}", e),
            }
        }

        debug!(count = layers.len(), "Listed Lambda layers");
        Ok(layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use release_registry_store::fixtures::{sample_registry, write_file};
    use release_registry_store::FileRegistryStore;

    #[tokio::test]
    async fn test_list_layers_keyed_by_canonical() {
        let dir = sample_registry();
        // a runtime without a readable record is skipped
        write_file(dir.path(), "aws-lambda-layers/ruby/latest.json", b"[]");

        let store = FileRegistryStore::open(dir.path()).await.unwrap();
        let service = DefaultLambdaLayerService::new(Arc::new(store));
        let layers = service.list_layers().await.unwrap();

        let keys: Vec<&str> = layers.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["aws-layer:node", "aws-layer:python"]);
        assert_eq!(
            layers["aws-layer:python"].str_field("layer_name"),
            Some("SentryPythonServerlessSDK")
        );
    }

    #[tokio::test]
    async fn test_list_layers_without_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRegistryStore::open(dir.path()).await.unwrap();
        let service = DefaultLambdaLayerService::new(Arc::new(store));
        assert!(service.list_layers().await.unwrap().is_empty());
    }
}
