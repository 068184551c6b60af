use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

// =============================================================================
// Defaults
// =============================================================================

/// Default listening port
pub const DEFAULT_PORT: u16 = 8080;

/// Per-call timeout for upstream fetches in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 3;

/// Cache TTL used when a request carries no cacheSeconds override (5 minutes)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Service index of the public package registry
pub const DEFAULT_FEED_URL: &str = "https://api.nuget.org/v3/index.json";

pub const DEFAULT_USER_AGENT: &str = concat!("badgery/", env!("CARGO_PKG_VERSION"));

/// Prefix of every environment variable override
pub const ENV_PREFIX: &str = "BADGERY_";

/// Service configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub cache: CacheConfig,
    pub registry: RegistryConfig,
    pub log: LogConfig,
    pub backends: Vec<BackendConfig>,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    /// Bind address; derived from the environment when absent
    pub host: Option<String>,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_PORT,
        }
    }
}

/// Upstream HTTP client settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Refuse plain-http upstream URLs
    pub https_only: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            https_only: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Sqlite,
    #[serde(rename = "none")]
    Disabled,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub default_ttl_secs: u64,
    /// SQLite database location; `:memory:` keeps entries in-process
    pub path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            default_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            path: ":memory:".to_string(),
        }
    }
}

/// How a search endpoint is picked among the advertised candidates
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EndpointSelection {
    #[default]
    Random,
    /// Lexicographically smallest candidate
    First,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryConfig {
    /// Service index URL, may contain `{param}` placeholders
    pub feed_url: String,
    pub endpoint_selection: EndpointSelection,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            endpoint_selection: EndpointSelection::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

/// A fixed-text custom backend
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    pub name: String,
    pub label: String,
    pub message: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl Config {
    /// Reads the optional TOML file, then applies `BADGERY_*` environment overrides
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Applies overrides from a variable lookup (the process environment in production)
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(value) = var("ENVIRONMENT") {
            self.environment = parse_enum(&value, "ENVIRONMENT")?;
        }
        if let Some(value) = var("HOST") {
            self.server.host = Some(value);
        }
        if let Some(value) = var("PORT") {
            self.server.port = parse_number(&value, "PORT")?;
        }
        if let Some(value) = var("HTTP_TIMEOUT_SECS") {
            self.http.timeout_secs = parse_number(&value, "HTTP_TIMEOUT_SECS")?;
        }
        if let Some(value) = var("CACHE_BACKEND") {
            self.cache.backend = parse_enum(&value, "CACHE_BACKEND")?;
        }
        if let Some(value) = var("CACHE_TTL_SECS") {
            self.cache.default_ttl_secs = parse_number(&value, "CACHE_TTL_SECS")?;
        }
        if let Some(value) = var("CACHE_PATH") {
            self.cache.path = value;
        }
        if let Some(value) = var("FEED_URL") {
            self.registry.feed_url = value;
        }
        if let Some(value) = var("LOG_LEVEL") {
            self.log.level = value;
        }
        if let Some(value) = var("LOG_FORMAT") {
            self.log.format = parse_enum(&value, "LOG_FORMAT")?;
        }
        if let Some(value) = var("LOG_FILE") {
            // An empty value selects the default file in the data directory
            self.log.file = Some(if value.trim().is_empty() {
                log_path()
            } else {
                PathBuf::from(value)
            });
        }
        Ok(())
    }

    /// Bind address: explicit host, else loopback in development and all interfaces otherwise
    pub fn bind_host(&self) -> &str {
        match (&self.server.host, self.environment) {
            (Some(host), _) => host,
            (None, Environment::Development) => "127.0.0.1",
            (None, Environment::Production) => "0.0.0.0",
        }
    }
}

fn parse_number<T>(value: &str, name: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for {}{}: '{}'", ENV_PREFIX, name, value))
}

fn parse_enum<T: serde::de::DeserializeOwned>(value: &str, name: &str) -> anyhow::Result<T> {
    serde_json::from_value(serde_json::Value::String(value.trim().to_lowercase()))
        .with_context(|| format!("Invalid value for {}{}: '{}'", ENV_PREFIX, name, value))
}

/// Returns the path to the data directory for badgery.
/// Uses $XDG_DATA_HOME/badgery if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/badgery,
/// or ./badgery if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the default path of the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("badgery.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("badgery")
}
