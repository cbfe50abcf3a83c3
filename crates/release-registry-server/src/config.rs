//! Server configuration
//!
//! This module handles hierarchical configuration loading from multiple sources:
//! - Default configuration file
//! - Environment-specific configuration file
//! - Environment variables
//! - Command-line arguments

use config::{Config, ConfigError, Environment, File};
use release_registry_api::{CacheConfig, CorsConfig as ApiCorsConfig, MiddlewareConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable switching the response cache on or off
pub const ENABLE_CACHE_VAR: &str = "REGISTRY_ENABLE_CACHE";

/// Environment in which the response cache is on by default
pub const PRODUCTION: &str = "production";

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server settings
    pub server: HttpServerConfig,

    /// Registry data settings
    pub registry: RegistryConfig,

    /// Response cache settings
    pub cache: CacheSettings,

    /// Logging settings
    pub logging: LoggingConfig,

    /// CORS settings
    pub cors: CorsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable graceful shutdown
    #[serde(default = "default_true")]
    pub graceful_shutdown: bool,

    /// Compress responses
    #[serde(default = "default_true")]
    pub compression: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            graceful_shutdown: default_true(),
            compression: default_true(),
        }
    }
}

/// Where the registry data lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Root of the registry tree (the directory holding `packages/`)
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

fn default_root() -> PathBuf {
    PathBuf::from("..")
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

/// Response cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Force the cache on or off; unset means "on in production"
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Maximum number of cached responses
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: u64,

    /// Time-to-live of a cached response in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
}

fn default_cache_max_entries() -> u64 {
    200
}

fn default_cache_ttl() -> u64 {
    3600
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: None,
            max_entries: default_cache_max_entries(),
            ttl_seconds: default_cache_ttl(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON formatting
    #[serde(default)]
    pub json_format: bool,

    /// Include thread IDs
    #[serde(default)]
    pub include_thread_ids: bool,

    /// Include target module
    #[serde(default = "default_true")]
    pub include_target: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            include_thread_ids: false,
            include_target: true,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins (empty means all)
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Max age for preflight requests in seconds
    #[serde(default = "default_cors_max_age")]
    pub max_age_seconds: u64,
}

fn default_cors_max_age() -> u64 {
    3600
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            max_age_seconds: default_cors_max_age(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from files and environment
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default configuration file (config/default.toml)
    /// 2. Environment-specific file (config/{env}.toml)
    /// 3. Environment variables (RELEASE_REGISTRY__*)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed
    pub fn load(config_dir: impl Into<PathBuf>, environment: &str) -> Result<Self, ConfigError> {
        let config_dir = config_dir.into();

        let config = Config::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", environment))).required(false))
            // e.g. RELEASE_REGISTRY__SERVER__PORT=8080
            .add_source(
                Environment::with_prefix("RELEASE_REGISTRY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration with defaults if files don't exist
    pub fn load_or_default(config_dir: impl Into<PathBuf>, environment: &str) -> Self {
        Self::load(config_dir, environment).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load configuration: {}", e);
            eprintln!("Using default configuration");
            Self::default()
        })
    }

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Middleware settings for the API, with the cache switched as resolved
    pub fn middleware_config(&self, cache_enabled: bool) -> MiddlewareConfig {
        let cache = CacheConfig::default()
            .with_enabled(cache_enabled)
            .with_max_entries(self.cache.max_entries)
            .with_ttl(Duration::from_secs(self.cache.ttl_seconds));

        MiddlewareConfig::new()
            .with_cors(ApiCorsConfig {
                allowed_origins: self.cors.allowed_origins.clone(),
                max_age: Duration::from_secs(self.cors.max_age_seconds),
            })
            .with_cache(cache)
            .with_compression(self.server.compression)
    }
}

/// Decide whether the response cache is on
///
/// A non-empty `REGISTRY_ENABLE_CACHE` wins and means "on" only when it is
/// `1`. Otherwise the configured value is used, and without one the cache is
/// on in production only.
pub fn resolve_cache_enabled(
    flag: Option<&str>,
    configured: Option<bool>,
    environment: &str,
) -> bool {
    match flag.map(str::trim).filter(|v| !v.is_empty()) {
        Some(flag) => flag == "1",
        None => configured.unwrap_or(environment == PRODUCTION),
    }
}
