//! Pipeline observer backed by tracing and Prometheus counters

use tracing::{debug, warn};

use super::metrics::{
    record_cache_error, record_cache_lookup, record_manifest_exclusion, record_upstream_error,
};
use crate::domain::repo_card::{PipelineEvent, PipelineObserver};

/// Logs absorbed failures and counts every event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl PipelineObserver for TracingObserver {
    fn record(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::ListCacheHit { username } => {
                debug!(username = %username, "Card list served from cache");
                record_cache_lookup("hit");
            }
            PipelineEvent::ListCacheMiss { username } => {
                debug!(username = %username, "Card list cache miss");
                record_cache_lookup("miss");
            }
            PipelineEvent::CacheReadFailed { key, error } => {
                warn!(key = %key, error = %error, "Cache read failed, continuing without cache");
                record_cache_error("read");
            }
            PipelineEvent::CacheWriteFailed { key, error } => {
                warn!(key = %key, error = %error, "Cache write failed");
                record_cache_error("write");
            }
            PipelineEvent::ManifestExcluded { repository, reason } => {
                debug!(repository = %repository, reason = %reason, "Repository excluded");
                record_manifest_exclusion(reason.label());
            }
            PipelineEvent::UpstreamFailed { username, error } => {
                warn!(username = %username, error = %error, "Repository listing failed");
                record_upstream_error();
            }
        }
    }
}
