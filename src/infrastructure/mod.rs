//! Infrastructure layer - External service implementations

pub mod cache;
pub mod github;
pub mod logging;
pub mod observability;
pub mod services;
