use axum::{http::Method, middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::repos;
use super::state::AppState;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Create the full router with application state
///
/// Every response, errors included, carries `Access-Control-Allow-Origin: *`.
/// Unknown paths and non-GET methods answer 404 with a JSON body.
pub fn create_router(state: AppState, metrics: Option<PrometheusMetrics>) -> Router {
    let mut router = Router::new()
        // Health endpoints
        .route("/health", get(health::health_check).fallback(repos::endpoint_not_found))
        .route("/ready", get(health::ready_check).fallback(repos::endpoint_not_found))
        .route("/live", get(health::live_check).fallback(repos::endpoint_not_found))
        // Card listings; a trailing slash is tolerated
        .route(
            "/api/repos/{username}",
            get(repos::list_repo_cards).fallback(repos::endpoint_not_found),
        )
        .route(
            "/api/repos/{username}/",
            get(repos::list_repo_cards).fallback(repos::endpoint_not_found),
        )
        .route(
            "/api/repos",
            get(repos::missing_username).fallback(repos::endpoint_not_found),
        )
        .route(
            "/api/repos/",
            get(repos::missing_username).fallback(repos::endpoint_not_found),
        )
        .fallback(repos::endpoint_not_found)
        .with_state(state);

    if let Some(m) = metrics {
        router = router.merge(create_metrics_router(m));
    }

    router
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([repos::CACHE_STATUS_HEADER])
}
