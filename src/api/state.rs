//! Application state for shared services

use std::sync::Arc;

use crate::domain::cache::Cache;
use crate::domain::DomainError;
use crate::infrastructure::services::{CardListing, RepoCardService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub repo_card_service: Arc<dyn RepoCardServiceTrait>,
    /// Checked by the readiness probe
    pub cache: Arc<dyn Cache>,
}

impl AppState {
    pub fn new(repo_card_service: Arc<dyn RepoCardServiceTrait>, cache: Arc<dyn Cache>) -> Self {
        Self {
            repo_card_service,
            cache,
        }
    }
}

/// Trait for card listing operations
#[async_trait::async_trait]
pub trait RepoCardServiceTrait: Send + Sync {
    async fn list_cards(&self, username: &str) -> Result<CardListing, DomainError>;
}

#[async_trait::async_trait]
impl RepoCardServiceTrait for RepoCardService {
    async fn list_cards(&self, username: &str) -> Result<CardListing, DomainError> {
        RepoCardService::list_cards(self, username).await
    }
}
