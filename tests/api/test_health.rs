// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Health and route registration tests

use super::support::*;
use axum::http::{Method, Request, StatusCode};
use axum::body::Body;
use fabstir_ocr_node::api::{create_app, HealthResponse};
use fabstir_ocr_node::vision::{EngineAvailability, EngineSet};
use tower::util::ServiceExt;

#[tokio::test]
async fn test_health_reports_engines() {
    let (ocr, _) = counting(ocr_lines(&["x"]));
    let (state, _dir) = test_state(EngineSet::default().with_ocr(ocr));

    let response = create_app(state).oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["engines"]["ocr"], true);
    assert_eq!(json["engines"]["layout"], false);
    assert_eq!(json["engines"]["table"], false);
    assert!(json["version"].as_str().unwrap().starts_with('v'));
}

#[tokio::test]
async fn test_health_lists_features() {
    let (state, _dir) = test_state(EngineSet::default());

    let response = create_app(state).oneshot(get_request("/health")).await.unwrap();
    let health: HealthResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();

    assert_eq!(health.version, fabstir_ocr_node::version::VERSION);
    assert!(health.features.iter().any(|f| f == "table-export"));
    assert_eq!(
        health.engines,
        EngineAvailability {
            ocr: false,
            layout: false,
            table: false
        }
    );
}

/// Every route family is mounted even without engines
#[tokio::test]
async fn test_routes_registered() {
    let (state, _dir) = test_state(EngineSet::default());

    for prefix in ["/ocr", "/layout", "/table"] {
        let response = create_app(state.clone())
            .oneshot(json_request(
                &format!("{}/predict-by-base64", prefix),
                serde_json::json!({ "base64_str": "aGVsbG8=" }),
            ))
            .await
            .unwrap();
        assert_ne!(response.status(), StatusCode::NOT_FOUND, "{}", prefix);
    }
}

#[tokio::test]
async fn test_table_url_route_is_post_only() {
    let (state, _dir) = test_state(EngineSet::default());

    let request = Request::builder()
        .method(Method::GET)
        .uri("/table/predict-by-url?url=http://localhost/a.png")
        .body(Body::empty())
        .unwrap();
    let response = create_app(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_cors_headers_present() {
    let (state, _dir) = test_state(EngineSet::default());

    let request = Request::builder()
        .uri("/health")
        .header("origin", "http://example.com")
        .body(Body::empty())
        .unwrap();
    let response = create_app(state).oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}
