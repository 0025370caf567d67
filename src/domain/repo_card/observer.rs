//! Structured channel for failures the pipeline absorbs
//!
//! Cache outages and per-repository manifest problems never change the
//! response a caller gets, but they are reported here so they stay
//! diagnosable.

use std::fmt::{self, Debug};

/// Why a repository was left out of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionReason {
    /// The manifest request answered with this non-success status
    ManifestMissing(u16),
    /// The manifest request failed before a response arrived
    FetchFailed(String),
    /// The manifest body was not a valid manifest document
    Malformed(String),
    /// The manifest has neither a banner nor a demo link
    NotQualifying,
}

impl ExclusionReason {
    /// Low-cardinality label for metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::ManifestMissing(_) => "missing",
            Self::FetchFailed(_) => "fetch_failed",
            Self::Malformed(_) => "malformed",
            Self::NotQualifying => "not_qualifying",
        }
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ManifestMissing(status) => write!(f, "manifest request returned {}", status),
            Self::FetchFailed(error) => write!(f, "manifest request failed: {}", error),
            Self::Malformed(error) => write!(f, "manifest is malformed: {}", error),
            Self::NotQualifying => write!(f, "manifest has neither banner nor demoLink"),
        }
    }
}

/// Event emitted by the enrichment pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    ListCacheHit { username: String },
    ListCacheMiss { username: String },
    CacheReadFailed { key: String, error: String },
    CacheWriteFailed { key: String, error: String },
    ManifestExcluded { repository: String, reason: ExclusionReason },
    UpstreamFailed { username: String, error: String },
}

/// Receiver of pipeline events
///
/// Implementations must not panic or block; they cannot influence the
/// pipeline's control flow.
pub trait PipelineObserver: Send + Sync + Debug {
    fn record(&self, event: PipelineEvent);
}

/// Observer that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn record(&self, _event: PipelineEvent) {}
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusion_labels() {
        assert_eq!(ExclusionReason::ManifestMissing(404).label(), "missing");
        assert_eq!(ExclusionReason::FetchFailed("x".into()).label(), "fetch_failed");
        assert_eq!(ExclusionReason::Malformed("x".into()).label(), "malformed");
        assert_eq!(ExclusionReason::NotQualifying.label(), "not_qualifying");
    }

    #[test]
    fn test_exclusion_display() {
        assert_eq!(
            ExclusionReason::ManifestMissing(404).to_string(),
            "manifest request returned 404"
        );
    }
}
