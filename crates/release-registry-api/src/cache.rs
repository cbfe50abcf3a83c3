//! Response cache
//!
//! Whole GET responses are cached in memory, keyed by path and query, with a
//! size bound and a time-to-live. Successful responses and 404s are cached;
//! anything else always goes to the handler. Responses served from the cache
//! carry an `X-From-Cache: 1` header.

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use moka::future::Cache;
use std::time::Duration;
use tracing::{debug, warn};

/// Header marking a response served from the cache
pub const FROM_CACHE_HEADER: HeaderName = HeaderName::from_static("x-from-cache");

/// Response cache settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Whether responses are cached at all
    pub enabled: bool,

    /// Maximum number of cached responses
    pub max_entries: u64,

    /// Time-to-live of a cached response
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_entries: 200,
            ttl: Duration::from_secs(3600),
        }
    }
}

impl CacheConfig {
    /// Enable/disable caching
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the maximum number of entries
    pub fn with_max_entries(mut self, max_entries: u64) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Set the time-to-live
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Build the cache, or `None` if caching is disabled
    pub fn build(&self) -> Option<ResponseCache> {
        self.enabled
            .then(|| ResponseCache::new(self.max_entries, self.ttl))
    }
}

#[derive(Clone)]
struct CachedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl CachedResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.headers, self.body).into_response();
        response
            .headers_mut()
            .insert(FROM_CACHE_HEADER, HeaderValue::from_static("1"));
        response
    }
}

/// In-memory cache of rendered responses
#[derive(Clone)]
pub struct ResponseCache {
    inner: Cache<String, CachedResponse>,
}

impl ResponseCache {
    /// Create a cache holding at most `max_entries` responses for `ttl`
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .build(),
        }
    }
}

fn is_cacheable(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::NOT_FOUND
}

/// Middleware serving and filling the response cache
pub async fn cache_responses(
    State(cache): State<ResponseCache>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    if let Some(cached) = cache.inner.get(&key).await {
        debug!(key = %key, "Serving response from cache");
        return cached.into_response();
    }

    let response = next.run(request).await;
    if !is_cacheable(response.status()) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let body = match to_bytes(body, usize::MAX).await {
        Ok(body) => body,
        Err(e) => {
            warn!(key = %key, "Failed to buffer response for caching: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    cache
        .inner
        .insert(
            key,
            CachedResponse {
                status: parts.status,
                headers: parts.headers.clone(),
                body: body.clone(),
            },
        )
        .await;

    Response::from_parts(parts, Body::from(body))
}
