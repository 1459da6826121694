//! Tests for the daemon's HTTP routes, driven through the router directly.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use logwarden::daemon::router;
use logwarden::{
    Config, ConfigHandle, IntegrationConfig, Logger, MetricsStore, NotifierManager,
};
use std::sync::Arc;
use std::time::Instant;
use tempfile::tempdir;
use tower::ServiceExt;

fn file_config(dir: &std::path::Path) -> Config {
    Config {
        default_log_path: dir.join("app.log").display().to_string(),
        level: "DEBUG".to_string(),
        format: "json".to_string(),
        ..Config::default()
    }
}

fn build(config: Config, dir: &std::path::Path) -> (Router, Arc<MetricsStore>) {
    let handle = ConfigHandle::new(config);
    let metrics = Arc::new(MetricsStore::open(dir.join("metrics.json")));
    let logger = Arc::new(Logger::new(
        handle.clone(),
        Arc::new(NotifierManager::new()),
        Arc::clone(&metrics),
    ));
    let app = router(logger, handle, Arc::clone(&metrics), Instant::now());
    (app, metrics)
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn health_reports_uptime() {
    let dir = tempdir().unwrap();
    let (app, _) = build(file_config(dir.path()), dir.path());

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let text = body_text(response).await;
    assert!(text.starts_with("OK\nUptime: "), "body was {text:?}");
    assert!(text.ends_with('s'));
}

#[tokio::test]
async fn metrics_route_is_gated_on_exposition() {
    let dir = tempdir().unwrap();
    let (app, metrics) = build(file_config(dir.path()), dir.path());

    let response = app
        .clone()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    metrics.enable_inline();
    metrics
        .add_metric("requests_total", 3.0, std::collections::HashMap::new())
        .unwrap();
    let response = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("requests_total 3"));
}

#[tokio::test]
async fn ingest_writes_the_entry() {
    let dir = tempdir().unwrap();
    let (app, _) = build(file_config(dir.path()), dir.path());

    let payload = r#"{"level":"ERROR","message":"disk on fire","source":"storage"}"#;
    let response = app
        .oneshot(
            Request::post("/log")
                .header("content-type", "application/json")
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Log entry accepted"));

    let written = std::fs::read_to_string(dir.path().join("app.log")).unwrap();
    assert!(written.contains("disk on fire"));
}

#[tokio::test]
async fn ingest_rejects_unknown_levels() {
    let dir = tempdir().unwrap();
    let (app, _) = build(file_config(dir.path()), dir.path());

    let response = app
        .oneshot(
            Request::post("/log")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"level":"verbose","message":"m"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn integration_routes_require_an_enabled_integration() {
    let dir = tempdir().unwrap();
    let mut config = file_config(dir.path());
    config
        .integrations
        .insert("github".to_string(), IntegrationConfig::default());
    let (app, _) = build(config, dir.path());

    let response = app
        .clone()
        .oneshot(Request::get("/gitlab/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(Request::get("/github/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::post("/github/receive")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"level":"WARN","message":"push failed"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Callback processed"));
}
