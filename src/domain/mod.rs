//! Domain layer - Core entities, contracts and errors

pub mod cache;
pub mod error;
pub mod repo_card;

pub use error::DomainError;
pub use repo_card::{
    DisplayCard, HostingClient, ManifestDocument, PipelineEvent, PipelineObserver,
    RepositorySummary,
};
