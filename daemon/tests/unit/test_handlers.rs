//! HTTP front and pipeline tests

use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use pushgate::events::{EventKind, EventManager};
use pushgate::server::serve::router;
use pushgate::server::state::ServerState;
use pushgate::storage::settings::DEFAULT_MAX_UPLOAD_BYTES;

use crate::support::{
    app_with, CountingFetcher, CountingPusher, RecordingDeployer, RecordingListener,
};

const DEPLOY_PATH: &str = "/v1/apps/Test/org/space/app";

async fn post(app: Router, path: &str, content_type: &str, body: impl Into<Body>) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, content_type)
        .body(body.into())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn manifest_body() -> String {
    r#"{"artifact_url": "https://artifacts.example.com/app.zip"}"#.to_string()
}

#[tokio::test]
async fn test_manifest_deploy_succeeds_on_every_foundation() {
    let fetcher = Arc::new(CountingFetcher::default());
    let pusher = Arc::new(CountingPusher::default());
    let app = app_with(fetcher.clone(), pusher.clone(), EventManager::new());

    let (status, body) = post(app, DEPLOY_PATH, "application/json", manifest_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("deploy successful"));
    assert!(body.contains("[f1] push succeeded"));
    assert!(body.contains("[f2] push succeeded"));
    assert_eq!(pusher.calls(), 2);
    assert_eq!(fetcher.fetches(), 1);
    assert_eq!(fetcher.releases(), 1);
}

#[tokio::test]
async fn test_archive_with_empty_body_is_rejected() {
    let fetcher = Arc::new(CountingFetcher::default());
    let pusher = Arc::new(CountingPusher::default());
    let app = app_with(fetcher.clone(), pusher.clone(), EventManager::new());

    let (status, body) = post(app, DEPLOY_PATH, "application/zip", Body::empty()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("request body is empty"));
    assert_eq!(pusher.calls(), 0);
    assert_eq!(fetcher.fetches(), 0);
}

#[tokio::test]
async fn test_archive_that_cannot_be_unpacked() {
    let fetcher = Arc::new(CountingFetcher::broken_zip("invalid Zip archive"));
    let pusher = Arc::new(CountingPusher::default());
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut events = EventManager::new();
    events.register_for(&[], Arc::new(RecordingListener::new("audit", log.clone())));
    let app = app_with(fetcher.clone(), pusher.clone(), events);

    let (status, body) = post(app, DEPLOY_PATH, "application/zip", vec![1u8, 2, 3]).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("could not process zip file"));
    assert_eq!(pusher.calls(), 0);
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_archive_deploy_succeeds_on_every_foundation() {
    let fetcher = Arc::new(CountingFetcher::default());
    let pusher = Arc::new(CountingPusher::default());
    let app = app_with(fetcher.clone(), pusher.clone(), EventManager::new());

    let (status, body) = post(app, DEPLOY_PATH, "application/zip", vec![1u8, 2, 3]).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("deploy successful"));
    assert!(body.contains("[f1] push succeeded"));
    assert!(body.contains("[f2] push succeeded"));
    assert_eq!(pusher.calls(), 2);
    assert_eq!(fetcher.fetches(), 1);
    assert_eq!(fetcher.releases(), 1);
}

#[tokio::test]
async fn test_archive_larger_than_axum_default_limit() {
    let fetcher = Arc::new(CountingFetcher::default());
    let pusher = Arc::new(CountingPusher::default());
    let app = app_with(fetcher.clone(), pusher.clone(), EventManager::new());

    let upload = vec![7u8; 3 * 1024 * 1024];
    let (status, body) = post(app, DEPLOY_PATH, "application/zip", upload).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("deploy successful"));
    assert_eq!(fetcher.fetches(), 1);
    assert_eq!(pusher.calls(), 2);
}

#[tokio::test]
async fn test_archive_push_failure_fails_the_deployment() {
    let fetcher = Arc::new(CountingFetcher::default());
    let pusher = Arc::new(CountingPusher::failing("internal server error"));
    let app = app_with(fetcher.clone(), pusher.clone(), EventManager::new());

    let (status, body) = post(app, DEPLOY_PATH, "application/zip", vec![1u8, 2, 3]).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("cannot deploy application"));
    assert!(body.contains("internal server error"));
    assert_eq!(pusher.calls(), 2);
    assert_eq!(fetcher.releases(), 1);
}

#[tokio::test]
async fn test_unsupported_content_type() {
    let fetcher = Arc::new(CountingFetcher::default());
    let pusher = Arc::new(CountingPusher::default());
    let app = app_with(fetcher.clone(), pusher.clone(), EventManager::new());

    let (status, body) = post(app, DEPLOY_PATH, "invalidContentType", manifest_body()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("content type 'invalidContentType' not supported"));
    assert_eq!(pusher.calls(), 0);
    assert_eq!(fetcher.fetches(), 0);
}

#[tokio::test]
async fn test_start_veto_prevents_every_push() {
    let fetcher = Arc::new(CountingFetcher::default());
    let pusher = Arc::new(CountingPusher::default());
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut events = EventManager::new();
    events.register_for(
        &[],
        Arc::new(RecordingListener::new("freeze", log.clone()).refusing(EventKind::DeployStart)),
    );
    let app = app_with(fetcher, pusher.clone(), events);

    let (status, body) = post(app, DEPLOY_PATH, "application/json", manifest_body()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("freeze refused deploy.start"));
    assert_eq!(pusher.calls(), 0);
    assert_eq!(*log.lock().unwrap(), vec!["freeze:deploy.start"]);
}

#[tokio::test]
async fn test_events_follow_the_verdict() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut events = EventManager::new();
    events.register_for(&[], Arc::new(RecordingListener::new("audit", log.clone())));
    let app = app_with(
        Arc::default(),
        Arc::new(CountingPusher::failing("boom")),
        events,
    );

    let (status, _) = post(app, DEPLOY_PATH, "application/zip", vec![1u8]).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "audit:deploy.start",
            "audit:deploy.failure",
            "audit:deploy.finish"
        ]
    );
}

#[tokio::test]
async fn test_unknown_environment() {
    let pusher = Arc::new(CountingPusher::default());
    let app = app_with(Arc::default(), pusher.clone(), EventManager::new());

    let (status, body) = post(
        app,
        "/v1/apps/Nope/org/space/app",
        "application/json",
        manifest_body(),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("environment 'Nope' not found"));
    assert_eq!(pusher.calls(), 0);
}

#[tokio::test]
async fn test_invalid_manifest_documents() {
    let fetcher = Arc::new(CountingFetcher::default());
    let pusher = Arc::new(CountingPusher::default());

    let app = app_with(fetcher.clone(), pusher.clone(), EventManager::new());
    let (status, body) = post(app, DEPLOY_PATH, "application/json", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("invalid deploy manifest"));

    let app = app_with(fetcher.clone(), pusher.clone(), EventManager::new());
    let (status, body) = post(
        app,
        DEPLOY_PATH,
        "application/json",
        r#"{"artifact_url": "not a url"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("invalid artifact url"));

    assert_eq!(fetcher.fetches(), 0);
    assert_eq!(pusher.calls(), 0);
}

#[tokio::test]
async fn test_content_type_routing_is_stable() {
    let deployer = Arc::new(RecordingDeployer::default());
    let fetcher = Arc::new(CountingFetcher::default());
    let app = router(
        Arc::new(ServerState::new(deployer.clone(), fetcher)),
        DEFAULT_MAX_UPLOAD_BYTES,
    );

    for _ in 0..2 {
        post(app.clone(), DEPLOY_PATH, "application/json", manifest_body()).await;
        post(app.clone(), DEPLOY_PATH, "application/zip; charset=binary", vec![1u8]).await;
        post(app.clone(), DEPLOY_PATH, "text/plain", "hello").await;
    }

    assert_eq!(
        *deployer.calls.lock().unwrap(),
        vec!["manifest", "archive", "manifest", "archive"]
    );
}

#[tokio::test]
async fn test_health() {
    let app = app_with(Arc::default(), Arc::default(), EventManager::new());
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let health: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["service"], "pushgate");
}
