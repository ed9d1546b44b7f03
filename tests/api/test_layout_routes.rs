// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! `/layout` route tests against an in-process engine

use super::support::*;
use axum::http::{header, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use fabstir_ocr_node::{api::create_app, vision::EngineSet};
use std::sync::atomic::Ordering;
use tower::util::ServiceExt;

fn page_regions() -> Vec<fabstir_ocr_node::LayoutRegion> {
    vec![
        text_region("text", [10, 40, 190, 60], &["Body", "paragraph"]),
        text_region("title", [10, 5, 190, 30], &["Annual Report"]),
        table_region(
            [10, 70, 190, 120],
            "<table><tr><td>Q1</td><td>Q2</td></tr><tr><td>10</td><td>20</td></tr></table>",
        ),
    ]
}

/// Envelope routes return the engine output untouched
#[tokio::test]
async fn test_predict_by_base64_returns_regions() {
    let (layout, calls) = counting(page_regions());
    let (state, _dir) = test_state(EngineSet::default().with_layout(layout));

    let response = create_app(state)
        .oneshot(json_request(
            "/layout/predict-by-base64",
            serde_json::json!({ "base64_str": STANDARD.encode(png_bytes(200, 140)) }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["resultcode"], 200);
    assert_eq!(json["data"][0]["type"], "text");
    assert_eq!(json["data"][1]["type"], "title");
    assert_eq!(json["data"][1]["bbox"], serde_json::json!([10, 5, 190, 30]));
    assert!(json["data"][2]["res"]["html"].as_str().unwrap().contains("<table>"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_predict_by_path() {
    let (layout, _) = counting(page_regions());
    let (state, dir) = test_state(EngineSet::default().with_layout(layout));
    let path = dir.path().join("page.png");
    write_png(&path, 200, 140);

    let uri = format!("/layout/predict-by-path?image_path={}", path.display());
    let response = create_app(state).oneshot(get_request(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 3);
}

/// The recovered document follows reading order, not engine order
#[tokio::test]
async fn test_predict_by_file_recovers_document() {
    let (layout, _) = counting(page_regions());
    let (state, _dir) = test_state(EngineSet::default().with_layout(layout));

    let response = create_app(state.clone())
        .oneshot(upload_request("/layout/predict-by-file", "report.jpg", &png_bytes(200, 140)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=report.docx"
    );

    let xml = docx_document_xml(body_bytes(response).await);
    let title = xml.find(">Annual Report</w:t>").unwrap();
    let body = xml.find(">Body </w:t>").unwrap();
    let table = xml.find("<w:tbl>").unwrap();
    assert!(title < body && body < table);
    assert!(xml.contains(r#"<w:pStyle w:val="Heading1"/>"#));
    assert!(xml.contains(">Q2</w:t>"));
    assert!(scratch_is_empty(&state));
}

#[tokio::test]
async fn test_predict_by_url_post() {
    let (layout, calls) = counting(page_regions());
    let (state, _dir) = test_state(EngineSet::default().with_layout(layout));
    let addr = spawn_image_server(png_bytes(200, 140)).await;

    let uri = format!("/layout/predict-by-url?url=http://{}/page.jpg", addr);
    let request = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = create_app(state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=page.docx"
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_engine_is_unavailable() {
    let (state, _dir) = test_state(EngineSet::default());

    let response = create_app(state)
        .oneshot(upload_request("/layout/predict-by-file", "report.png", &png_bytes(8, 8)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
