//! Observability infrastructure - Metrics and pipeline event reporting

mod metrics;
mod observer;

pub use metrics::{
    create_metrics_router, init_metrics, record_cache_error, record_cache_lookup,
    record_http_request, record_manifest_exclusion, record_upstream_error, PrometheusMetrics,
    UNMATCHED_PATH,
};
pub use observer::TracingObserver;
