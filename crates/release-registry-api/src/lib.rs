//! Release Registry API Layer
//!
//! This crate provides the read-only HTTP API of the Release Registry using
//! Axum: request handlers, the response cache, middleware and the mapping of
//! service errors onto HTTP responses.
//!
//! # Architecture
//!
//! - **Handlers**: one handler per registry endpoint
//! - **Routes**: route table, with cached and uncached groups
//! - **Cache**: in-memory TTL cache of whole GET responses
//! - **Middleware**: CORS, compression, tracing and request IDs
//! - **Error Handling**: conversion of service errors to JSON error bodies
//!
//! # Example
//!
//! ```rust,no_run
//! use release_registry_api::{build_router, AppState};
//! use release_registry_service::ServiceRegistry;
//!
//! # async fn example(services: ServiceRegistry) {
//! let state = AppState::new(services);
//! let app = build_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//! axum::serve(listener, app).await.unwrap();
//! # }
//! ```

pub mod cache;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod responses;
pub mod routes;

// Re-export main types for convenience
pub use cache::{cache_responses, CacheConfig, ResponseCache, FROM_CACHE_HEADER};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use handlers::{AppState, ListQuery};
pub use middleware::{CorsConfig, MiddlewareConfig, UuidRequestIdGenerator};
pub use responses::{AppVersionResponse, DownloadRedirect, DIGEST_HEADER};
pub use routes::{build_router, build_router_with_cache};

use axum::Router;
use release_registry_service::ServiceRegistry;

/// Build a complete API server with middleware
///
/// This is a convenience function that builds a router with all middleware
/// configured using default settings. The response cache is off.
///
/// # Example
///
/// ```rust,no_run
/// use release_registry_api::build_api_server;
/// use release_registry_service::ServiceRegistry;
///
/// # async fn example(services: ServiceRegistry) {
/// let app = build_api_server(services);
/// # }
/// ```
pub fn build_api_server(services: ServiceRegistry) -> Router {
    build_api_server_with_config(services, MiddlewareConfig::default())
}

/// Build API server with custom middleware configuration
///
/// # Example
///
/// ```rust,no_run
/// use release_registry_api::{build_api_server_with_config, CacheConfig, MiddlewareConfig};
/// use release_registry_service::ServiceRegistry;
///
/// # async fn example(services: ServiceRegistry) {
/// let middleware_config = MiddlewareConfig::new()
///     .with_compression(true)
///     .with_cache(CacheConfig::default().with_enabled(true));
///
/// let app = build_api_server_with_config(services, middleware_config);
/// # }
/// ```
pub fn build_api_server_with_config(
    services: ServiceRegistry,
    middleware_config: MiddlewareConfig,
) -> Router {
    let state = AppState::new(services);
    let cache = middleware_config.cache.build();
    if cache.is_some() {
        tracing::info!(
            max_entries = middleware_config.cache.max_entries,
            ttl_seconds = middleware_config.cache.ttl.as_secs(),
            "Response cache enabled"
        );
    }
    let router = build_router_with_cache(state, cache);

    middleware_config.wrap(router)
}
