//! Integration test: serving JSON model artifacts from disk

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tabular_serve::server::{create_router, AppState, ServerConfig};
use tower::ServiceExt;

fn write_model(dir: &Path, name: &str, artifact: Value) {
    let model_dir = dir.join(name);
    std::fs::create_dir_all(&model_dir).unwrap();
    std::fs::write(model_dir.join("model.json"), artifact.to_string()).unwrap();
}

fn app_for(root: &Path, ttl_secs: u64) -> axum::Router {
    let config = ServerConfig::default()
        .with_model_root(root.to_string_lossy())
        .with_cache_ttl(ttl_secs);
    create_router(Arc::new(AppState::new(config)))
}

fn compensation_payload() -> Value {
    json!({
        "schema": {
            "fields": [
                {"name": "index", "type": "integer"},
                {"name": "years", "type": "integer"},
                {"name": "level", "type": "integer"},
                {"name": "compensation", "type": "number"}
            ],
            "primaryKey": ["index"],
            "pandas_version": "1.4.0"
        },
        "data": [
            {"index": 0, "years": 2, "level": 1, "compensation": null},
            {"index": 1, "years": 10, "level": 3, "compensation": 91000.0}
        ]
    })
}

async fn predict(app: axum::Router, request: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("content-type", "application/json")
                .body(Body::from(request.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_constant_model_directory_uri_fills_whole_column() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path(), "constant", json!({"kind": "constant", "value": 52000.0}));

    // Known values are replaced too, not just the nulls.
    let (status, json) = predict(
        app_for(dir.path(), 600),
        json!({"model_uri": "constant", "target": "compensation", "data": compensation_payload()}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["data"],
        json!([
            {"years": 2, "level": 1, "compensation": 52000.0},
            {"years": 10, "level": 3, "compensation": 52000.0}
        ])
    );
    assert_eq!(json["schema"]["fields"][2], json!({"name": "compensation", "type": "number"}));
}

#[tokio::test]
async fn test_linear_model_file_uri() {
    let dir = tempfile::tempdir().unwrap();
    write_model(
        dir.path(),
        "linear",
        json!({
            "kind": "linear",
            "features": ["years", "level"],
            "coefficients": [1000.0, 5000.0],
            "intercept": 40000.0
        }),
    );
    let uri = format!("file://{}", dir.path().join("linear").join("model.json").display());

    let (status, json) = predict(
        app_for(dir.path(), 600),
        json!({"model_uri": uri, "target": "compensation", "data": compensation_payload()}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let predicted: Vec<Value> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["compensation"].clone())
        .collect();
    assert_eq!(predicted, vec![json!(47000), json!(65000)]);
}

#[tokio::test]
async fn test_zero_ttl_reloads_changed_artifact() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path(), "m", json!({"kind": "constant", "value": 1}));
    let app = app_for(dir.path(), 0);
    let request = json!({"model_uri": "m", "target": "compensation", "data": compensation_payload()});

    let (_, first) = predict(app.clone(), request.clone()).await;
    assert_eq!(first["data"][0]["compensation"], json!(1));

    write_model(dir.path(), "m", json!({"kind": "constant", "value": 2}));
    let (_, second) = predict(app, request).await;
    assert_eq!(second["data"][0]["compensation"], json!(2));
}

#[tokio::test]
async fn test_cached_artifact_survives_file_change_within_ttl() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path(), "m", json!({"kind": "constant", "value": 1}));
    let app = app_for(dir.path(), 600);
    let request = json!({"model_uri": "m", "target": "compensation", "data": compensation_payload()});

    predict(app.clone(), request.clone()).await;
    write_model(dir.path(), "m", json!({"kind": "constant", "value": 2}));
    let (_, second) = predict(app, request).await;
    assert_eq!(second["data"][0]["compensation"], json!(1));
}

#[tokio::test]
async fn test_corrupt_artifact_returns_traceback() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("bad")).unwrap();
    std::fs::write(dir.path().join("bad").join("model.json"), "{\"kind\": \"forest\"}").unwrap();

    let (status, json) = predict(
        app_for(dir.path(), 600),
        json!({"model_uri": "bad", "target": "compensation", "data": compensation_payload()}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let traceback = json["traceback"].as_str().unwrap();
    assert!(traceback.contains("ModelLoadError"));
    assert!(traceback.contains("Caused by"));
}

#[tokio::test]
async fn test_unsupported_scheme_returns_traceback() {
    let dir = tempfile::tempdir().unwrap();
    let (_, json) = predict(
        app_for(dir.path(), 600),
        json!({"model_uri": "gs://bucket/model", "target": "compensation", "data": compensation_payload()}),
    )
    .await;
    assert!(json["traceback"].as_str().unwrap().contains("unsupported URI scheme"));
}
