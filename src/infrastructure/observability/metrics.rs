//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::MetricsSettings;

/// Path label used for requests that matched no route
pub const UNMATCHED_PATH: &str = "{unmatched}";

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
    path: String,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Initialize Prometheus metrics
///
/// Returns `None` when disabled or when a global recorder is already
/// installed.
pub fn init_metrics(settings: &MetricsSettings) -> Option<PrometheusMetrics> {
    if !settings.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            register_default_metrics();

            tracing::info!("Prometheus metrics initialized at {}", settings.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
                path: settings.path.clone(),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

fn register_default_metrics() {
    gauge!("repo_card_proxy_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics) -> Router {
    let path = metrics.path().to_string();

    Router::new()
        .route(&path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
///
/// `route` is the matched route template, or `None` for unmatched requests.
pub fn record_http_request(method: &str, route: Option<&str>, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", route.unwrap_or(UNMATCHED_PATH).to_string()),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Record a list cache lookup (`hit` or `miss`)
pub fn record_cache_lookup(result: &'static str) {
    counter!("repo_cards_cache_lookups_total", "result" => result).increment(1);
}

/// Record a cache operation (`read` or `write`) that failed
pub fn record_cache_error(operation: &'static str) {
    counter!("repo_cards_cache_errors_total", "operation" => operation).increment(1);
}

/// Record a repository left out of a listing
pub fn record_manifest_exclusion(reason: &'static str) {
    counter!("repo_cards_manifest_exclusions_total", "reason" => reason).increment(1);
}

/// Record a failed repository listing call
pub fn record_upstream_error() {
    counter!("repo_cards_upstream_errors_total").increment(1);
}
