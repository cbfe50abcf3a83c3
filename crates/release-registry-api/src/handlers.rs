//! API request handlers
//!
//! This module implements HTTP request handlers for all API endpoints.

use axum::{
    extract::{Path, Query, State},
    http::Uri,
    response::{IntoResponse, Response},
    Json,
};
use release_registry_core::PackageEntry;
use release_registry_service::{
    AppList, DownloadRequest, LambdaLayerList, PackageList, ResolvedSlug, SdkList,
    ServiceRegistry, SlugList, VersionsResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, instrument};

use crate::{
    error::{ApiError, ApiResult},
    responses::{health_ok, AppVersionResponse, DownloadRedirect},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Service registry
    pub services: Arc<ServiceRegistry>,
}

impl AppState {
    /// Create new application state
    pub fn new(services: ServiceRegistry) -> Self {
        Self {
            services: Arc::new(services),
        }
    }
}

/// Query parameters of the listing endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Fail instead of skipping unreadable records
    #[serde(default)]
    pub strict: Option<String>,
}

impl ListQuery {
    /// Whether `strict` was given a truthy value
    pub fn is_strict(&self) -> bool {
        self.strict.as_deref().map_or(false, is_truthy)
    }
}

/// `true`, `1` or `yes`, ignoring case
pub fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

/// Query parameters of `/apps/{id}/{version}`
#[derive(Debug, Default, Deserialize)]
pub struct AppVersionQuery {
    /// `download` turns the response into a redirect
    #[serde(default)]
    pub response: Option<String>,

    #[serde(flatten)]
    pub download: DownloadRequest,
}

// ============================================================================
// Package Handlers
// ============================================================================

/// List the latest entry of every package
#[instrument(skip(state))]
pub async fn list_packages(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<PackageList>> {
    let packages = state
        .services
        .packages()
        .list_packages(query.is_strict())
        .await?;
    Ok(Json(packages))
}

/// Versions or a single version of a package
///
/// The canonical may itself contain `/`, so the last path segment decides
/// between `versions` and a concrete version.
#[instrument(skip(state))]
pub async fn package_route(
    State(state): State<AppState>,
    Path(rest): Path<String>,
) -> ApiResult<Response> {
    let (canonical, tail) = rest
        .rsplit_once('/')
        .filter(|(canonical, tail)| !canonical.is_empty() && !tail.is_empty())
        .ok_or_else(|| ApiError::not_found(format!("Unknown package path: {}", rest)))?;

    let packages = state.services.packages();
    if tail == "versions" {
        debug!(canonical, "Getting package versions");
        let versions = packages.get_package_versions(canonical).await?;
        Ok(Json(versions).into_response())
    } else {
        debug!(canonical, version = tail, "Getting package");
        let entry = packages.get_package(canonical, tail).await?;
        Ok(Json(entry).into_response())
    }
}

// ============================================================================
// SDK Handlers
// ============================================================================

/// List the latest package entry of every SDK
#[instrument(skip(state))]
pub async fn list_sdks(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<SdkList>> {
    let sdks = state.services.sdks().list_sdks(query.is_strict()).await?;
    Ok(Json(sdks))
}

/// Versions of the package behind an SDK
#[instrument(skip(state))]
pub async fn get_sdk_versions(
    State(state): State<AppState>,
    Path(sdk_id): Path<String>,
) -> ApiResult<Json<VersionsResponse>> {
    Ok(Json(state.services.sdks().get_sdk_versions(&sdk_id).await?))
}

/// One version of the package behind an SDK
#[instrument(skip(state))]
pub async fn get_sdk(
    State(state): State<AppState>,
    Path((sdk_id, version)): Path<(String, String)>,
) -> ApiResult<Json<PackageEntry>> {
    Ok(Json(state.services.sdks().get_sdk(&sdk_id, &version).await?))
}

// ============================================================================
// App Handlers
// ============================================================================

/// List the latest release of every app
#[instrument(skip(state))]
pub async fn list_apps(State(state): State<AppState>) -> ApiResult<Json<AppList>> {
    Ok(Json(state.services.apps().list_apps().await?))
}

/// An app release, or a redirect to one of its files with `response=download`
#[instrument(skip(state))]
pub async fn get_app_version(
    State(state): State<AppState>,
    Path((app_id, version)): Path<(String, String)>,
    Query(query): Query<AppVersionQuery>,
) -> ApiResult<AppVersionResponse> {
    let apps = state.services.apps();

    if query.response.as_deref() == Some("download") {
        let target = apps
            .resolve_download(&app_id, &version, &query.download)
            .await?;
        return Ok(AppVersionResponse::Download(DownloadRedirect(target)));
    }

    Ok(AppVersionResponse::Entry(apps.get_app(&app_id, &version).await?))
}

// ============================================================================
// Marketing Slug Handlers
// ============================================================================

/// List all marketing slugs
#[instrument(skip(state))]
pub async fn list_marketing_slugs(State(state): State<AppState>) -> ApiResult<Json<SlugList>> {
    Ok(Json(state.services.marketing().list_slugs().await?))
}

/// A marketing slug with its resolved target
#[instrument(skip(state))]
pub async fn resolve_marketing_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ResolvedSlug>> {
    Ok(Json(state.services.marketing().resolve_slug(&slug).await?))
}

// ============================================================================
// Lambda Layer Handlers
// ============================================================================

/// List the latest AWS Lambda layer of every runtime
#[instrument(skip(state))]
pub async fn list_lambda_layers(
    State(state): State<AppState>,
) -> ApiResult<Json<LambdaLayerList>> {
    Ok(Json(state.services.layers().list_layers().await?))
}

// ============================================================================
// Health
// ============================================================================

/// Liveness check
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Response> {
    if let Err(e) = state.services.health().await {
        error!("Health check failed: {}", e);
        return Err(ApiError::internal_server_error("Registry root is unavailable"));
    }
    Ok(health_ok())
}

/// Fallback for unknown paths
pub async fn not_found(uri: Uri) -> ApiError {
    debug!(path = %uri.path(), "No route");
    ApiError::not_found(format!("Not found: {}", uri.path()))
}
