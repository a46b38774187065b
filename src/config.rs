//! Configuration types for mediafold.
//!
//! Settings are loaded from `mediafold.toml` and then overridden by a small
//! set of environment variables:
//!
//! - [`Config`] - Root configuration struct
//! - [`ServerConfig`] - HTTP server settings
//! - [`RemoteConfig`] - Remote asset service credentials and addressing
//! - [`WalkConfig`] - Paging and batching used by the orchestrators
//! - [`CacheConfig`] - Response cache expiry
//! - [`RetrySettings`] - Backoff for transient remote failures
//! - [`LoggingConfig`] - Log output format
//!
//! Every section is optional; missing fields fall back to defaults suitable
//! for local development.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::constants;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// mediafold.toml configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub remote: RemoteConfig,
    pub walk: WalkConfig,
    pub cache: CacheConfig,
    pub retry: RetrySettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// How many higher ports to try when the configured one is taken.
    pub port_fallback_attempts: u16,
    /// Origins allowed by CORS. Empty allows any origin.
    pub allowed_origins: Vec<String>,
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: constants::DEFAULT_PORT,
            port_fallback_attempts: constants::DEFAULT_PORT_FALLBACK_ATTEMPTS,
            allowed_origins: Vec::new(),
            max_body_bytes: constants::DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Which [`AssetBackend`](crate::remote::AssetBackend) to run against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Cloudinary,
    Memory,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub backend: BackendKind,
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Root segment some assets are stored under (see [`RootAlias`]).
    ///
    /// [`RootAlias`]: crate::paths::RootAlias
    pub root_alias: String,
    /// Folder the aggregate file view and the default file listing read from.
    pub library_root: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            cloud_name: None,
            api_key: None,
            api_secret: None,
            api_base_url: constants::CLOUDINARY_API_BASE.to_string(),
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT_SECS,
            root_alias: constants::DEFAULT_ROOT_ALIAS.to_string(),
            library_root: constants::DEFAULT_LIBRARY_ROOT.to_string(),
        }
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("backend", &self.backend)
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("root_alias", &self.root_alias)
            .field("library_root", &self.library_root)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    pub search_page_size: usize,
    /// Ids per batch delete call, at most [`constants::MAX_BATCH_SIZE`].
    pub batch_size: usize,
    /// Batch delete calls in flight at once within one folder.
    pub delete_concurrency: usize,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            search_page_size: constants::DEFAULT_SEARCH_PAGE_SIZE,
            batch_size: constants::MAX_BATCH_SIZE,
            delete_concurrency: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: constants::DEFAULT_CACHE_TTL.as_secs(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 200,
            max_delay_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl Config {
    /// Load configuration from mediafold.toml in the current directory, or
    /// defaults if the file does not exist. Environment overrides apply in
    /// both cases.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Path::new(constants::CONFIG_FILE);
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from the specified path, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (IO error)
    /// - The file contains invalid TOML syntax
    /// - Fields have invalid types
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from the specified path without environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply `PORT`, `CLOUDINARY_*` and `FRONTEND_URL` overrides.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }
        if let Some(v) = lookup("CLOUDINARY_CLOUD_NAME") {
            self.remote.cloud_name = Some(v);
        }
        if let Some(v) = lookup("CLOUDINARY_API_KEY") {
            self.remote.api_key = Some(v);
        }
        if let Some(v) = lookup("CLOUDINARY_API_SECRET") {
            self.remote.api_secret = Some(v);
        }
        if let Some(origin) = lookup("FRONTEND_URL")
            && !origin.trim().is_empty()
            && !self.server.allowed_origins.contains(&origin)
        {
            self.server.allowed_origins.push(origin);
        }
    }

    /// Validate configuration with comprehensive checks.
    ///
    /// Returns a `ValidationResult` containing any non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns an error listing every problem found.
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // 1. Server
        if self.server.port == 0 {
            errors.push(
                "Server port cannot be 0. Use a valid port number (1-65535)\n  \
                 Common ports: 5000 (default), 8080, 3000"
                    .to_string(),
            );
        }
        if self.server.port > 0 && self.server.port < 1024 {
            warnings.push(format!(
                "Server port {} is a system/privileged port (< 1024)\n  \
                 Recommendation: Use ports >= 1024 to avoid permission issues",
                self.server.port
            ));
        }
        for origin in &self.server.allowed_origins {
            if url::Url::parse(origin).is_err() {
                errors.push(format!("Invalid CORS origin: {origin}"));
            }
        }
        if self.server.max_body_bytes == 0 {
            errors.push("server.max_body_bytes cannot be 0".to_string());
        }

        // 2. Remote
        if self.remote.backend == BackendKind::Cloudinary {
            for (name, value) in [
                ("remote.cloud_name", &self.remote.cloud_name),
                ("remote.api_key", &self.remote.api_key),
                ("remote.api_secret", &self.remote.api_secret),
            ] {
                if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
                    errors.push(format!(
                        "{name} is required for the cloudinary backend\n  \
                         Set it in mediafold.toml or via the CLOUDINARY_* environment variables"
                    ));
                }
            }
            if url::Url::parse(&self.remote.api_base_url).is_err() {
                errors.push(format!(
                    "remote.api_base_url is not a valid URL: {}",
                    self.remote.api_base_url
                ));
            }
        }
        if self.remote.request_timeout_secs == 0 {
            errors.push("remote.request_timeout_secs cannot be 0".to_string());
        }
        if self.remote.root_alias.trim_matches('/').is_empty() {
            errors.push("remote.root_alias cannot be empty".to_string());
        } else if self.remote.root_alias.trim_matches('/').contains('/') {
            errors.push(format!(
                "remote.root_alias must be a single path segment (got: '{}')",
                self.remote.root_alias
            ));
        }
        if self.remote.library_root.trim_matches('/').is_empty() {
            errors.push("remote.library_root cannot be empty".to_string());
        }

        // 3. Walk
        if self.walk.search_page_size == 0 {
            errors.push("walk.search_page_size cannot be 0".to_string());
        }
        if self.walk.batch_size == 0 || self.walk.batch_size > constants::MAX_BATCH_SIZE {
            errors.push(format!(
                "walk.batch_size must be between 1 and {} (got: {})",
                constants::MAX_BATCH_SIZE,
                self.walk.batch_size
            ));
        }
        if self.walk.delete_concurrency == 0 {
            errors.push("walk.delete_concurrency cannot be 0".to_string());
        } else if self.walk.delete_concurrency > 4 {
            warnings.push(format!(
                "walk.delete_concurrency {} is high\n  \
                 Recommendation: Keep it at 1-4 to stay under remote rate limits",
                self.walk.delete_concurrency
            ));
        }

        // 4. Cache and retry
        if self.cache.ttl_secs == 0 {
            errors.push("cache.ttl_secs cannot be 0".to_string());
        }
        if self.retry.initial_delay_ms > self.retry.max_delay_ms {
            warnings.push(format!(
                "retry.initial_delay_ms ({}) exceeds retry.max_delay_ms ({})",
                self.retry.initial_delay_ms, self.retry.max_delay_ms
            ));
        }

        if !errors.is_empty() {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }

        Ok(ValidationResult { warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn memory_config() -> Config {
        let mut config = Config::default();
        config.remote.backend = BackendKind::Memory;
        config
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.walk.batch_size, 100);
        assert_eq!(config.walk.search_page_size, 500);
        assert_eq!(config.cache.ttl(), Duration::from_secs(300));
        assert_eq!(config.remote.root_alias, "home");
        assert_eq!(config.remote.backend, BackendKind::Cloudinary);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.server.max_body_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[server]
port = 8080
allowed_origins = ["http://localhost:3000"]
max_body_bytes = 1048576

[remote]
backend = "memory"
root_alias = "library"
library_root = "library"

[walk]
batch_size = 50
delete_concurrency = 2

[cache]
ttl_secs = 60

[logging]
format = "json"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.server.max_body_bytes, 1_048_576);
        assert_eq!(config.remote.backend, BackendKind::Memory);
        assert_eq!(config.remote.root_alias, "library");
        assert_eq!(config.walk.batch_size, 50);
        assert_eq!(config.walk.delete_concurrency, 2);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("PORT", "7000"),
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "key"),
            ("CLOUDINARY_API_SECRET", "secret"),
            ("FRONTEND_URL", "https://app.example.com"),
        ]);
        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.remote.cloud_name.as_deref(), Some("demo"));
        assert_eq!(
            config.server.allowed_origins,
            vec!["https://app.example.com"]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unparseable_port_env_is_ignored() {
        let mut config = Config::default();
        config.apply_env(|key| (key == "PORT").then(|| "not-a-port".to_string()));
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_validate_missing_credentials() {
        let err = Config::default().validate().unwrap_err().to_string();
        assert!(err.contains("remote.cloud_name is required"));
        assert!(err.contains("remote.api_key is required"));
        assert!(err.contains("remote.api_secret is required"));
    }

    #[test]
    fn test_validate_memory_backend_needs_no_credentials() {
        assert!(memory_config().validate().is_ok());
    }

    #[test]
    fn test_validate_batch_size_bounds() {
        let mut config = memory_config();
        config.walk.batch_size = 101;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("walk.batch_size must be between 1 and 100"));

        config.walk.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_port_zero() {
        let mut config = memory_config();
        config.server.port = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("port cannot be 0"));
    }

    #[test]
    fn test_validate_collects_every_error() {
        let mut config = memory_config();
        config.cache.ttl_secs = 0;
        config.walk.search_page_size = 0;
        config.walk.delete_concurrency = 0;
        config.remote.root_alias = "/".to_string();
        config.server.max_body_bytes = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("cache.ttl_secs"));
        assert!(err.contains("server.max_body_bytes"));
        assert!(err.contains("walk.search_page_size"));
        assert!(err.contains("walk.delete_concurrency"));
        assert!(err.contains("remote.root_alias cannot be empty"));
    }

    #[test]
    fn test_validate_warnings() {
        let mut config = memory_config();
        config.server.port = 80;
        config.walk.delete_concurrency = 8;
        let result = config.validate().unwrap();
        assert!(result.has_warnings());
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 9001\n[remote]\nbackend = \"memory\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.remote.backend, BackendKind::Memory);
    }

    #[test]
    fn test_load_from_invalid_toml() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let mut config = RemoteConfig::default();
        config.api_secret = Some("hunter2".to_string());
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
