//! Repository card pipeline
//!
//! Cache-aside over two tiers: the finished card list per user, and each
//! repository's manifest. Only the repository listing call can fail a
//! request; cache and manifest problems are reported to the observer and
//! otherwise ignored.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future;
use futures::stream::{self, StreamExt};

use crate::config::AppConfig;
use crate::domain::cache::{manifest_key, repo_list_key, Cache, CacheExt};
use crate::domain::repo_card::{
    DisplayCard, ExclusionReason, HostingClient, ManifestDocument, ManifestFetch,
    PipelineEvent, PipelineObserver, RepositorySummary,
};
use crate::domain::DomainError;

/// Whether a listing was served from the list cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    /// Value of the `X-Cache-Status` response header
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cards for one user plus where they came from
#[derive(Debug, Clone, PartialEq)]
pub struct CardListing {
    pub cards: Vec<DisplayCard>,
    pub cache_status: CacheStatus,
}

/// Pipeline tuning
#[derive(Debug, Clone)]
pub struct RepoCardServiceConfig {
    pub list_ttl: Duration,
    pub manifest_ttl: Duration,
    /// Manifest fetches allowed in flight for one listing
    pub max_concurrent_fetches: usize,
}

impl Default for RepoCardServiceConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for RepoCardServiceConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            list_ttl: Duration::from_secs(config.cache.list_ttl_secs),
            manifest_ttl: Duration::from_secs(config.cache.manifest_ttl_secs),
            max_concurrent_fetches: config.github.max_concurrent_fetches,
        }
    }
}

/// Builds display card listings for a user
#[derive(Debug, Clone)]
pub struct RepoCardService {
    cache: Arc<dyn Cache>,
    hosting: Arc<dyn HostingClient>,
    observer: Arc<dyn PipelineObserver>,
    config: RepoCardServiceConfig,
}

impl RepoCardService {
    pub fn new(
        cache: Arc<dyn Cache>,
        hosting: Arc<dyn HostingClient>,
        observer: Arc<dyn PipelineObserver>,
        config: RepoCardServiceConfig,
    ) -> Self {
        Self {
            cache,
            hosting,
            observer,
            config,
        }
    }

    /// Returns the cards for `username`, from cache when possible
    ///
    /// Fails only on an empty username or when the repository listing
    /// cannot be retrieved.
    pub async fn list_cards(&self, username: &str) -> Result<CardListing, DomainError> {
        if username.trim().is_empty() {
            return Err(DomainError::validation("Username is required"));
        }

        let list_key = repo_list_key(username);

        if let Some(cards) = self.cached_cards(&list_key).await {
            self.observer.record(PipelineEvent::ListCacheHit {
                username: username.to_string(),
            });
            return Ok(CardListing {
                cards,
                cache_status: CacheStatus::Hit,
            });
        }

        self.observer.record(PipelineEvent::ListCacheMiss {
            username: username.to_string(),
        });

        let repositories = match self.hosting.list_repositories(username).await {
            Ok(repositories) => repositories,
            Err(e) => {
                self.observer.record(PipelineEvent::UpstreamFailed {
                    username: username.to_string(),
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        // An empty list is cached too so users without repositories don't
        // cost an upstream call on every request
        let cards = if repositories.is_empty() {
            Vec::new()
        } else {
            self.enrich_all(username, repositories).await
        };

        self.store(&list_key, &cards, self.config.list_ttl).await;

        Ok(CardListing {
            cards,
            cache_status: CacheStatus::Miss,
        })
    }

    /// Enriches every repository, keeping upstream order for survivors
    async fn enrich_all(
        &self,
        username: &str,
        repositories: Vec<RepositorySummary>,
    ) -> Vec<DisplayCard> {
        let limit = self.config.max_concurrent_fetches.max(1);

        stream::iter(repositories)
            .map(|repository| self.enrich(username, repository))
            .buffered(limit)
            .filter_map(future::ready)
            .collect()
            .await
    }

    async fn enrich(&self, username: &str, repository: RepositorySummary) -> Option<DisplayCard> {
        let manifest = match self.cached_manifest(username, &repository).await {
            Some(manifest) => manifest,
            None => self.fetch_manifest(username, &repository).await?,
        };

        Some(DisplayCard::from_parts(&repository, &manifest))
    }

    async fn cached_cards(&self, key: &str) -> Option<Vec<DisplayCard>> {
        match self.cache.get::<Vec<DisplayCard>>(key).await {
            Ok(cards) => cards,
            Err(e) => {
                self.report_read_failure(key, e);
                None
            }
        }
    }

    async fn cached_manifest(
        &self,
        username: &str,
        repository: &RepositorySummary,
    ) -> Option<ManifestDocument> {
        let key = manifest_key(username, &repository.name);

        match self.cache.get::<ManifestDocument>(&key).await {
            // Entries that no longer qualify are refetched rather than trusted
            Ok(manifest) => manifest.filter(ManifestDocument::is_qualifying),
            Err(e) => {
                self.report_read_failure(&key, e);
                None
            }
        }
    }

    async fn fetch_manifest(
        &self,
        username: &str,
        repository: &RepositorySummary,
    ) -> Option<ManifestDocument> {
        let fetched = self
            .hosting
            .fetch_manifest(username, &repository.name, &repository.default_branch)
            .await;

        let reason = match fetched {
            Ok(ManifestFetch::Found(manifest)) if manifest.is_qualifying() => {
                let key = manifest_key(username, &repository.name);
                self.store(&key, &manifest, self.config.manifest_ttl).await;
                return Some(manifest);
            }
            Ok(ManifestFetch::Found(_)) => ExclusionReason::NotQualifying,
            Ok(ManifestFetch::Missing(status)) => ExclusionReason::ManifestMissing(status),
            Ok(ManifestFetch::Malformed(error)) => ExclusionReason::Malformed(error),
            Err(e) => ExclusionReason::FetchFailed(e.to_string()),
        };

        self.observer.record(PipelineEvent::ManifestExcluded {
            repository: repository.name.clone(),
            reason,
        });
        None
    }

    /// Best-effort write; failures are reported, never returned
    async fn store<V>(&self, key: &str, value: &V, ttl: Duration)
    where
        V: serde::Serialize + Send + Sync + ?Sized,
    {
        if let Err(e) = self.cache.set(key, value, ttl).await {
            self.observer.record(PipelineEvent::CacheWriteFailed {
                key: key.to_string(),
                error: e.to_string(),
            });
        }
    }

    fn report_read_failure(&self, key: &str, error: DomainError) {
        self.observer.record(PipelineEvent::CacheReadFailed {
            key: key.to_string(),
            error: error.to_string(),
        });
    }
}
