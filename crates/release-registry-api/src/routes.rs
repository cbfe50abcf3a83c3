//! API route definitions
//!
//! This module defines all API routes and builds the router.

use axum::{middleware, routing::get, Router};

use crate::{
    cache::{cache_responses, ResponseCache},
    handlers::{
        get_app_version, get_sdk, get_sdk_versions, health_check, list_apps, list_lambda_layers,
        list_marketing_slugs, list_packages, list_sdks, not_found, package_route,
        resolve_marketing_slug, AppState,
    },
};

/// Build the API router without a response cache
pub fn build_router(state: AppState) -> Router {
    build_router_with_cache(state, None)
}

/// Build the API router, caching registry reads when a cache is given
///
/// App release lookups (which double as the download redirect) and the
/// health check always reach their handlers.
pub fn build_router_with_cache(state: AppState, cache: Option<ResponseCache>) -> Router {
    let mut registry_routes = build_registry_routes();
    if let Some(cache) = cache {
        registry_routes =
            registry_routes.route_layer(middleware::from_fn_with_state(cache, cache_responses));
    }

    Router::new()
        .route("/healthz", get(health_check))
        .route("/apps/{app_id}/{version}", get(get_app_version))
        .merge(registry_routes)
        .fallback(not_found)
        .with_state(state)
}

fn build_registry_routes() -> Router<AppState> {
    Router::new()
        // Packages; the canonical may contain slashes
        .route("/packages", get(list_packages))
        .route("/packages/{*path}", get(package_route))
        // SDKs
        .route("/sdks", get(list_sdks))
        .route("/sdks/{sdk_id}/versions", get(get_sdk_versions))
        .route("/sdks/{sdk_id}/{version}", get(get_sdk))
        // Apps
        .route("/apps", get(list_apps))
        // Marketing slugs
        .route("/marketing-slugs", get(list_marketing_slugs))
        .route("/marketing-slugs/{slug}", get(resolve_marketing_slug))
        // AWS Lambda layers
        .route("/aws-lambda-layers", get(list_lambda_layers))
}
