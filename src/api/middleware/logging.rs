//! Per-request access log

use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

use crate::api::repos::CACHE_STATUS_HEADER;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Emits one line per request once the response is ready, tagged with the
/// requested username and the cache outcome. Only `origin` is read from the
/// request headers. The request id is echoed back on the response.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let route = route_of(&request);
    let username = username_of(&route, request.uri().path()).unwrap_or_default();
    let origin = header_str(&request, "origin").unwrap_or_default();
    let request_id = request_id_of(&request);

    let mut response = next.run(request).await;

    let status = response.status().as_u16();
    let latency_ms = start.elapsed().as_millis();
    let cache = response
        .headers()
        .get(CACHE_STATUS_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    if response.status().is_server_error() {
        warn!(%method, %route, %username, %origin, status, %cache, latency_ms, %request_id, "Request failed");
    } else {
        info!(%method, %route, %username, %origin, status, %cache, latency_ms, %request_id, "Request served");
    }

    response
}

/// Route template, so usernames do not fan out the `route` field
fn route_of(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| "{unmatched}".to_string())
}

fn username_of(route: &str, path: &str) -> Option<String> {
    if !route.ends_with("{username}") {
        return None;
    }

    path.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn header_str(request: &Request<Body>, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn request_id_of(request: &Request<Body>) -> String {
    header_str(request, REQUEST_ID_HEADER.as_str())
        .filter(|id| !id.is_empty() && id.len() <= 128)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/api/repos/{username}", get(|| async { "[]" }))
            .layer(middleware::from_fn(logging_middleware))
    }

    #[test]
    fn test_username_only_taken_from_repo_route() {
        assert_eq!(
            username_of("/api/repos/{username}", "/api/repos/alice"),
            Some("alice".to_string())
        );
        assert_eq!(username_of("/health", "/health"), None);
        assert_eq!(username_of("{unmatched}", "/api/repos/alice/extra"), None);
    }

    #[test]
    fn test_request_id_is_reused_or_generated() {
        let with_id = Request::builder()
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_id_of(&with_id), "abc-123");

        let without_id = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(request_id_of(&without_id).len(), 36);

        let oversized = Request::builder()
            .header("x-request-id", "x".repeat(200))
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_id_of(&oversized).len(), 36);
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/repos/alice")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn test_generated_request_id_is_returned() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/repos/alice")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let id = response.headers()["x-request-id"].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }
}
