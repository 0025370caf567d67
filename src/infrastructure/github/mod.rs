//! GitHub hosting backend

mod client;

pub use client::{GitHubClient, GitHubClientConfig};
