use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use repo_card_proxy::api::{create_router, AppState};
use repo_card_proxy::domain::cache::{Cache, CacheExt};
use repo_card_proxy::domain::repo_card::{NoopObserver, DEFAULT_BANNER};
use repo_card_proxy::infrastructure::cache::InMemoryCache;
use repo_card_proxy::infrastructure::github::{GitHubClient, GitHubClientConfig};
use repo_card_proxy::infrastructure::services::{RepoCardService, RepoCardServiceConfig};

struct TestApp {
    router: Router,
    cache: Arc<dyn Cache>,
}

fn test_app(base_url: String) -> TestApp {
    test_app_with_config(base_url, RepoCardServiceConfig::default())
}

fn test_app_with_config(base_url: String, config: RepoCardServiceConfig) -> TestApp {
    let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::new());
    let hosting =
        GitHubClient::new(GitHubClientConfig::default().with_base_url(base_url)).unwrap();
    let service = RepoCardService::new(
        cache.clone(),
        Arc::new(hosting),
        Arc::new(NoopObserver),
        config,
    );

    TestApp {
        router: create_router(AppState::new(Arc::new(service), cache.clone()), None),
        cache,
    }
}

async fn get(app: &TestApp, uri: &str) -> Response {
    app.router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn repo_json(name: &str, description: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "html_url": format!("https://github.com/alice/{}", name),
        "description": description,
        "default_branch": "main",
        "fork": false
    })
}

async fn mount_listing(server: &MockServer, repos: serde_json::Value, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/users/alice/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repos))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_listing_is_enriched_then_served_from_cache() {
    let server = MockServer::start().await;

    mount_listing(
        &server,
        serde_json::json!([repo_json("site", None), repo_json("tool", Some("CLI"))]),
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/alice/site/main/project.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"banner": "https://x/b.png"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/alice/tool/main/project.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let app = test_app(server.uri());
    let expected = serde_json::json!([{
        "name": "site",
        "html_url": "https://github.com/alice/site",
        "description": "No description available",
        "banner": "https://x/b.png",
        "demoLink": ""
    }]);

    let first = get(&app, "/api/repos/alice").await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers()["x-cache-status"], "MISS");
    assert_eq!(first.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(body_json(first).await, expected);

    let second = get(&app, "/api/repos/alice").await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(second.headers()["x-cache-status"], "HIT");
    assert_eq!(body_json(second).await, expected);
}

#[tokio::test]
async fn test_manifest_cache_outlives_list_cache() {
    let server = MockServer::start().await;

    mount_listing(&server, serde_json::json!([repo_json("site", Some("Home"))]), 2).await;

    Mock::given(method("GET"))
        .and(path("/alice/site/main/project.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"demoLink": "https://alice.dev"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    // List entries expire immediately; manifests keep their hour
    let app = test_app_with_config(
        server.uri(),
        RepoCardServiceConfig {
            list_ttl: Duration::ZERO,
            ..Default::default()
        },
    );

    let first = body_json(get(&app, "/api/repos/alice").await).await;
    assert_eq!(first[0]["banner"], DEFAULT_BANNER);
    assert_eq!(first[0]["description"], "Home");

    let response = get(&app, "/api/repos/alice").await;
    assert_eq!(response.headers()["x-cache-status"], "MISS");
    assert_eq!(body_json(response).await, first);
}

#[tokio::test]
async fn test_empty_listing_is_cached() {
    let server = MockServer::start().await;

    mount_listing(&server, serde_json::json!([]), 1).await;

    let app = test_app(server.uri());

    let first = get(&app, "/api/repos/alice").await;
    assert_eq!(first.headers()["x-cache-status"], "MISS");
    assert_eq!(body_json(first).await, serde_json::json!([]));

    let cached: Option<Vec<serde_json::Value>> = app.cache.get("repos_alice").await.unwrap();
    assert_eq!(cached, Some(Vec::new()));

    let second = get(&app, "/api/repos/alice").await;
    assert_eq!(second.headers()["x-cache-status"], "HIT");
    assert_eq!(body_json(second).await, serde_json::json!([]));
}

#[tokio::test]
async fn test_upstream_error_is_mirrored_and_not_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/ghost/repos"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let app = test_app(server.uri());

    for _ in 0..2 {
        let response = get(&app, "/api/repos/ghost").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "GitHub API error: Not Found"})
        );
    }

    assert!(app.cache.get_raw("repos_ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn test_unreachable_upstream_is_server_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let app = test_app(uri);

    let response = get(&app, "/api/repos/alice").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("Server error: "));
}

#[tokio::test]
async fn test_malformed_and_non_qualifying_manifests_are_excluded() {
    let server = MockServer::start().await;

    mount_listing(
        &server,
        serde_json::json!([
            repo_json("broken", None),
            repo_json("listed", None),
            repo_json("plain", None),
            repo_json("site", Some("Home"))
        ]),
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/alice/broken/main/project.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/alice/listed/main/project.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!(["https://x/b.png", "https://listed.dev"])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/alice/plain/main/project.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"banner": "", "title": "Plain"})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/alice/site/main/project.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"banner": "https://x/b.png"})),
        )
        .mount(&server)
        .await;

    let app = test_app(server.uri());

    let body = body_json(get(&app, "/api/repos/alice").await).await;

    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|card| card["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["site"]);
    assert!(app.cache.get_raw("project_json_alice_listed").await.unwrap().is_none());
    assert!(app.cache.get_raw("project_json_alice_plain").await.unwrap().is_none());
    assert!(app.cache.get_raw("project_json_alice_site").await.unwrap().is_some());
}
