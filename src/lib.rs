//! Repo Card Proxy
//!
//! Serves display cards for a user's public repositories. Each card merges
//! the hosting API's repository metadata with an opt-in `project.json`
//! manifest from the repository's default branch, behind a two-tier cache.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::info;

use api::state::AppState;
use domain::{DomainError, HostingClient, PipelineObserver};
use infrastructure::{
    cache::{CacheConfig, CacheFactory},
    github::{GitHubClient, GitHubClientConfig},
    observability::TracingObserver,
    services::{RepoCardService, RepoCardServiceConfig},
};

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    validate_config(config)?;

    let cache_config = CacheConfig::from_settings(&config.cache)?;
    info!("Cache backend: {}", cache_config.cache_type);
    let cache = CacheFactory::new().create(&cache_config).await?;

    let hosting: Arc<dyn HostingClient> = Arc::new(GitHubClient::new(GitHubClientConfig::from(
        &config.github,
    ))?);

    if config.github.token.is_some() {
        info!("Hosting API requests are authenticated");
    } else {
        info!("No hosting API token configured, requests are unauthenticated");
    }

    let observer: Arc<dyn PipelineObserver> = Arc::new(TracingObserver::new());

    let service = RepoCardService::new(
        cache.clone(),
        hosting,
        observer,
        RepoCardServiceConfig::from(config),
    );

    Ok(AppState::new(Arc::new(service), cache))
}

/// Rejects settings the pipeline cannot run with
pub fn validate_config(config: &AppConfig) -> Result<(), DomainError> {
    if config.github.max_concurrent_fetches == 0 {
        return Err(DomainError::configuration(
            "github.max_concurrent_fetches must be at least 1",
        ));
    }

    if config.github.per_page == 0 || config.github.per_page > 100 {
        return Err(DomainError::configuration(
            "github.per_page must be between 1 and 100",
        ));
    }

    if config.metrics.enabled && !config.metrics.path.starts_with('/') {
        return Err(DomainError::configuration("metrics.path must start with '/'"));
    }

    Ok(())
}
