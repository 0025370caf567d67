use serde::Deserialize;

/// Environment variable consulted when no token is configured
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub github: GitHubSettings,
    #[serde(default)]
    pub metrics: MetricsSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Cache store and entry lifetimes
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// `in_memory` or `redis`
    #[serde(default = "default_cache_backend")]
    pub backend: String,
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default)]
    pub key_prefix: Option<String>,
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Lifetime of a user's card list
    #[serde(default = "default_list_ttl_secs")]
    pub list_ttl_secs: u64,
    /// Lifetime of a repository manifest
    #[serde(default = "default_manifest_ttl_secs")]
    pub manifest_ttl_secs: u64,
}

/// Hosting API and raw content endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubSettings {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_raw_content_base_url")]
    pub raw_content_base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Upper bound on manifest fetches in flight for one request
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

/// Prometheus metrics endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            redis_url: None,
            key_prefix: None,
            max_capacity: default_max_capacity(),
            list_ttl_secs: default_list_ttl_secs(),
            manifest_ttl_secs: default_manifest_ttl_secs(),
        }
    }
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            raw_content_base_url: default_raw_content_base_url(),
            token: None,
            user_agent: default_user_agent(),
            per_page: default_per_page(),
            timeout_secs: default_timeout_secs(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cache_backend() -> String {
    "in_memory".to_string()
}

fn default_max_capacity() -> u64 {
    10_000
}

fn default_list_ttl_secs() -> u64 {
    300
}

fn default_manifest_ttl_secs() -> u64 {
    3600
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_raw_content_base_url() -> String {
    "https://raw.githubusercontent.com".to_string()
}

fn default_user_agent() -> String {
    "repo-card-proxy".to_string()
}

fn default_per_page() -> u32 {
    100
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_concurrent_fetches() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: Self = config.try_deserialize()?;
        app_config.github.token =
            resolve_token(app_config.github.token, std::env::var(GITHUB_TOKEN_ENV).ok());

        Ok(app_config)
    }
}

/// Picks the configured token, falling back to the conventional env var.
/// Empty values count as unset.
fn resolve_token(configured: Option<String>, from_env: Option<String>) -> Option<String> {
    configured
        .filter(|token| !token.trim().is_empty())
        .or_else(|| from_env.filter(|token| !token.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cache.list_ttl_secs, 300);
        assert_eq!(config.cache.manifest_ttl_secs, 3600);
        assert_eq!(config.github.per_page, 100);
        assert_eq!(config.github.api_base_url, "https://api.github.com");
        assert!(config.github.token.is_none());
        assert!(config.metrics.enabled);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"server": {"port": 9000}, "github": {"max_concurrent_fetches": 4}}"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.github.max_concurrent_fetches, 4);
        assert_eq!(config.github.user_agent, "repo-card-proxy");
        assert_eq!(config.cache.backend, "in_memory");
    }

    #[test]
    fn test_resolve_token_prefers_configured() {
        assert_eq!(
            resolve_token(Some("configured".into()), Some("env".into())),
            Some("configured".to_string())
        );
    }

    #[test]
    fn test_resolve_token_falls_back_to_env() {
        assert_eq!(
            resolve_token(Some("  ".into()), Some("env".into())),
            Some("env".to_string())
        );
        assert_eq!(resolve_token(None, Some(String::new())), None);
        assert_eq!(resolve_token(None, None), None);
    }
}
