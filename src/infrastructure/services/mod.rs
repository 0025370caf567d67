//! Infrastructure services

mod repo_card_service;

pub use repo_card_service::{CacheStatus, CardListing, RepoCardService, RepoCardServiceConfig};
