//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, CacheSettings, GitHubSettings, LogFormat, LoggingConfig, MetricsSettings,
    ServerConfig, GITHUB_TOKEN_ENV,
};
