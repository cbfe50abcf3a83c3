//! Middleware stack wrapped around the router
//!
//! Request IDs and access logging apply to every response. CORS and
//! compression are configurable. The response cache is not a layer of its own
//! here: it is attached to the registry routes in [`crate::routes`].

use axum::http::{header, HeaderValue, Method, Request};
use axum::Router;
use std::time::Duration;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::{warn, Level};
use uuid::Uuid;

use crate::cache::{CacheConfig, FROM_CACHE_HEADER};
use crate::responses::DIGEST_HEADER;

/// Gives requests without an `x-request-id` a random UUID
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestIdGenerator;

impl MakeRequestId for UuidRequestIdGenerator {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

type AccessLog = TraceLayer<SharedClassifier<ServerErrorsAsFailures>>;

/// One INFO span per request, closed with status and latency in ms
fn access_log() -> AccessLog {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .latency_unit(LatencyUnit::Millis)
                .level(Level::INFO),
        )
}

/// Browser access to the registry
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Origins allowed to read responses; empty allows any origin
    pub allowed_origins: Vec<String>,

    /// How long a preflight answer may be cached
    pub max_age: Duration,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age: Duration::from_secs(3600),
        }
    }
}

impl CorsConfig {
    fn allow_origin(&self) -> AllowOrigin {
        if self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*") {
            return AllowOrigin::any();
        }

        let origins = self.allowed_origins.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| warn!(origin = %origin, "Ignoring invalid CORS origin"))
                .ok()
        });
        AllowOrigin::list(origins)
    }

    /// CORS layer for a read-only API
    pub fn into_layer(self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(self.allow_origin())
            .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
            .allow_headers(Any)
            .expose_headers([
                header::LOCATION,
                DIGEST_HEADER,
                FROM_CACHE_HEADER,
                header::HeaderName::from_static("x-request-id"),
            ])
            .max_age(self.max_age)
    }
}

/// What [`crate::build_api_server_with_config`] puts around the routes
#[derive(Debug, Clone)]
pub struct MiddlewareConfig {
    pub cors: CorsConfig,
    pub cache: CacheConfig,

    /// Negotiate response compression from `Accept-Encoding`
    pub compression: bool,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            cors: CorsConfig::default(),
            cache: CacheConfig::default(),
            compression: true,
        }
    }
}

impl MiddlewareConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.cors = cors;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_compression(mut self, enable: bool) -> Self {
        self.compression = enable;
        self
    }

    /// Wrap `router` in CORS, compression, access log and request ID layers
    ///
    /// Layers added last run first. `SetRequestIdLayer` has to be outermost
    /// so the ID exists by the time the access log and the propagation layer
    /// look for it.
    pub(crate) fn wrap(self, router: Router) -> Router {
        let mut router = router.layer(self.cors.into_layer());
        if self.compression {
            router = router.layer(CompressionLayer::new());
        }

        router
            .layer(access_log())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestIdGenerator))
    }
}
