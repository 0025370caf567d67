use async_trait::async_trait;
use std::fmt::Debug;

use super::{ManifestDocument, RepositorySummary};
use crate::domain::DomainError;

/// Result of looking up a repository's manifest file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestFetch {
    /// The file exists and decoded into a manifest
    Found(ManifestDocument),
    /// The raw content host answered with a non-success status
    Missing(u16),
    /// The file exists but is not a valid manifest
    Malformed(String),
}

/// Trait for source code hosting backends (the listing API plus raw content)
#[async_trait]
pub trait HostingClient: Send + Sync + Debug {
    /// Lists a user's public repositories
    ///
    /// A non-success status is returned as [`DomainError::Upstream`].
    async fn list_repositories(
        &self,
        username: &str,
    ) -> Result<Vec<RepositorySummary>, DomainError>;

    /// Fetches the manifest file from `branch` of `username/repository`
    async fn fetch_manifest(
        &self,
        username: &str,
        repository: &str,
        branch: &str,
    ) -> Result<ManifestFetch, DomainError>;
}
