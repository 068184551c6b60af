//! Static, custom backend and caching behavior through the HTTP adapter

mod helper;

use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;

use badgery::badge::SvgRenderer;
use badgery::cache::{MemoryStore, NullStore};
use badgery::config::BackendConfig;
use badgery::resource::BadgeResource;
use badgery::server::Router;
use helper::{CountingSource, get, router, test_config};

fn counting_router(source: Arc<CountingSource>, cache: Arc<dyn badgery::cache::CacheStore>) -> Router {
    Router::new().route(
        "/count/{text}",
        BadgeResource::new(source, cache, Arc::new(SvgRenderer), Duration::from_secs(60)),
    )
}

#[tokio::test]
async fn shield_text_is_normalized() {
    let router = router(&test_config(None));

    let (status, content_type, body) = get(&router, "/badge/Hello%20World__foo--bar").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "image/svg+xml");
    assert!(body.contains("Hello World_foo-bar"));
    assert!(body.contains(">shield<"));
}

#[tokio::test]
async fn shield_accepts_style_and_colors() {
    let router = router(&test_config(None));

    let (status, _, body) = get(
        &router,
        "/badge/ok?label=checks&color=ff0000&labelColor=black&style=for-the-badge",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("#ff0000"));
    assert!(body.contains("CHECKS"));
}

#[tokio::test]
async fn invalid_color_is_bad_request() {
    let router = router(&test_config(None));

    let (status, content_type, body) = get(&router, "/badge/ok?color=nope").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(content_type, "text/plain; charset=utf-8");
    assert_eq!(body, "Invalid color: nope");
}

#[tokio::test]
async fn unknown_custom_backend_is_not_found() {
    let router = router(&test_config(None));

    let (status, _, body) = get(&router, "/custom/backend/doesnotexist").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("doesnotexist"));
}

#[tokio::test]
async fn configured_custom_backend_is_served() {
    let mut config = test_config(None);
    config.backends.push(BackendConfig {
        name: "team".to_string(),
        label: "owner".to_string(),
        message: "platform".to_string(),
        color: Some("blue".to_string()),
    });
    let router = router(&config);

    let (status, _, body) = get(&router, "/custom/backend/team").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("owner"));
    assert!(body.contains("platform"));
    assert!(body.contains("#0000ff"));
}

#[tokio::test]
async fn version_backend_reports_service_version() {
    let router = router(&test_config(None));

    let (status, _, body) = get(&router, "/custom/backend/version").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn query_order_does_not_change_the_cache_key() {
    let source = Arc::new(CountingSource::default());
    let router = counting_router(source.clone(), Arc::new(MemoryStore::new()));

    let (_, _, first) = get(&router, "/count/x?label=a&color=red").await;
    let (_, _, second) = get(&router, "/count/x?color=red&label=a").await;
    let (_, _, other) = get(&router, "/count/x?color=blue&label=a").await;

    assert_eq!(first, second);
    assert_ne!(first, other);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn repeated_query_keys_do_not_share_a_cache_entry() {
    let source = Arc::new(CountingSource::default());
    let router = counting_router(source.clone(), Arc::new(MemoryStore::new()));

    let (_, _, red_last) = get(&router, "/count/x?color=blue&color=red").await;
    let (_, _, blue_last) = get(&router, "/count/x?color=red&color=blue").await;
    let (_, _, red) = get(&router, "/count/x?color=red").await;

    assert_ne!(red_last, blue_last);
    assert_eq!(red_last, red);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn oversized_cache_seconds_still_renders() {
    let router = router(&test_config(None));

    let (status, _, body) = get(&router, "/badge/ok?cacheSeconds=18446744073709551615").await;
    let (cached_status, _, cached) = get(&router, "/badge/ok?cacheSeconds=18446744073709551615").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(">ok<"));
    assert_eq!(cached_status, StatusCode::OK);
    assert_eq!(body, cached);
}

#[tokio::test]
async fn concurrent_first_requests_both_succeed() {
    let source = Arc::new(CountingSource::default());
    let router = counting_router(source.clone(), Arc::new(MemoryStore::new()));

    let ((status_a, _, body_a), (status_b, _, body_b)) = tokio::join!(
        get(&router, "/count/same"),
        get(&router, "/count/same"),
    );

    assert_eq!(status_a, StatusCode::OK);
    assert_eq!(status_b, StatusCode::OK);
    assert_eq!(body_a, body_b);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn disabled_cache_resolves_every_time() {
    let source = Arc::new(CountingSource::default());
    let router = counting_router(source.clone(), Arc::new(NullStore));

    get(&router, "/count/x").await;
    get(&router, "/count/x").await;

    assert_eq!(source.calls(), 2);
}
