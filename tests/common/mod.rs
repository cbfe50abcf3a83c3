//! Common test utilities and helpers
//!
//! Each test gets its own registry tree in a temporary directory and a server
//! bound to a random local port.

#![allow(dead_code)]

use release_registry_api::{build_api_server, build_api_server_with_config, MiddlewareConfig};
use release_registry_service::ServiceRegistry;
use release_registry_store::fixtures::sample_registry;
use release_registry_store::FileRegistryStore;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test application state
pub struct TestApp {
    pub address: String,
    pub registry: TempDir,
}

impl TestApp {
    /// Serve the sample registry with default middleware
    pub async fn new() -> Self {
        Self::spawn(None).await
    }

    /// Serve the sample registry with custom middleware
    pub async fn with_config(config: MiddlewareConfig) -> Self {
        Self::spawn(Some(config)).await
    }

    async fn spawn(config: Option<MiddlewareConfig>) -> Self {
        let registry = sample_registry();
        let store = FileRegistryStore::open(registry.path())
            .await
            .expect("Failed to open sample registry");
        let services = ServiceRegistry::new(Arc::new(store));

        let app = match config {
            Some(config) => build_api_server_with_config(services, config),
            None => build_api_server(services),
        };

        // Start server on random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let address = listener.local_addr().expect("Failed to get local address");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Failed to start test server");
        });

        Self {
            address: format!("http://{}", address),
            registry,
        }
    }

    /// Get base URL
    pub fn url(&self) -> &str {
        &self.address
    }

    /// HTTP client that does not follow redirects
    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build client")
    }

    /// GET a path relative to the server
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client()
            .get(format!("{}{}", self.url(), path))
            .send()
            .await
            .expect("Failed to send request")
    }
}

/// Parse JSON response
pub async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> T {
    response
        .json::<T>()
        .await
        .expect("Failed to parse JSON response")
}

/// Assert response status
pub fn assert_status(response: &reqwest::Response, expected: reqwest::StatusCode) {
    assert_eq!(
        response.status(),
        expected,
        "Expected status {} for {}, got {}",
        expected,
        response.url(),
        response.status()
    );
}
