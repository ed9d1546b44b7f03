// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Intake rejections: wrong extensions, unreachable URLs, missing uploads
//! and unconfigured engines. None of them may reach an engine.

use super::support::*;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use fabstir_ocr_node::{
    api::create_app,
    vision::{EngineError, EngineHandle, EngineSet, InferenceEngine, LayoutRegion, TextLine},
};
use image::DynamicImage;
use mockall::mock;
use std::sync::Arc;
use tower::util::ServiceExt;

mock! {
    pub Ocr {}

    #[async_trait]
    impl InferenceEngine for Ocr {
        type Output = Vec<TextLine>;
        async fn infer(&self, image: &DynamicImage) -> Result<Vec<TextLine>, EngineError>;
    }
}

mock! {
    pub Structure {}

    #[async_trait]
    impl InferenceEngine for Structure {
        type Output = Vec<LayoutRegion>;
        async fn infer(&self, image: &DynamicImage) -> Result<Vec<LayoutRegion>, EngineError>;
    }
}

/// Engines that fail the test if they are ever called
fn untouchable_engines() -> EngineSet {
    let mut ocr = MockOcr::new();
    ocr.expect_infer().never();
    let mut layout = MockStructure::new();
    layout.expect_infer().never();
    let mut table = MockStructure::new();
    table.expect_infer().never();

    let ocr: Arc<dyn InferenceEngine<Output = Vec<TextLine>>> = Arc::new(ocr);
    let layout: Arc<dyn InferenceEngine<Output = Vec<LayoutRegion>>> = Arc::new(layout);
    let table: Arc<dyn InferenceEngine<Output = Vec<LayoutRegion>>> = Arc::new(table);

    EngineSet::default()
        .with_ocr(EngineHandle::new(ocr, 1, None))
        .with_layout(EngineHandle::new(layout, 1, None))
        .with_table(EngineHandle::new(table, 1, None))
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn detail_of(response: axum::response::Response) -> String {
    body_json(response).await["detail"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_upload_with_wrong_extension_rejected() {
    let (state, _dir) = test_state(untouchable_engines());

    for route in ["/ocr", "/layout", "/table"] {
        let response = create_app(state.clone())
            .oneshot(upload_request(
                &format!("{}/predict-by-file", route),
                "scan.gif",
                &png_bytes(4, 4),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", route);
        assert_eq!(
            detail_of(response).await,
            "Please upload images in .jpg or .png format"
        );
    }
    assert!(scratch_is_empty(&state));
}

#[tokio::test]
async fn test_url_with_wrong_extension_rejected() {
    let (state, _dir) = test_state(untouchable_engines());

    for route in ["/ocr", "/layout", "/table"] {
        let response = create_app(state.clone())
            .oneshot(post(&format!(
                "{}/predict-by-url?url=http://127.0.0.1:9/doc.pdf",
                route
            )))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", route);
        assert_eq!(
            detail_of(response).await,
            "Please provide URLs to images in .jpg or .png format"
        );
    }
}

/// A non-200 answer is a client error and leaves no files behind
#[tokio::test]
async fn test_unreachable_url_rejected() {
    let (state, _dir) = test_state(untouchable_engines());
    let addr = spawn_image_server(png_bytes(4, 4)).await;

    for route in ["/ocr", "/layout", "/table"] {
        let uri = format!("{}/predict-by-url?url=http://{}/gone.png", route, addr);
        let response = create_app(state.clone()).oneshot(post(&uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", route);
        assert_eq!(detail_of(response).await, "Unable to access the provided URL");
    }
    assert!(scratch_is_empty(&state));
}

#[tokio::test]
async fn test_oversized_download_rejected() {
    let (state, _dir) = test_state(untouchable_engines());
    let addr = spawn_image_server(png_bytes(4, 4)).await;

    for route in ["/ocr", "/layout", "/table"] {
        let uri = format!("{}/predict-by-url?url=http://{}/huge.png", route, addr);
        let response = create_app(state.clone()).oneshot(post(&uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", route);
        assert!(detail_of(response).await.contains("too large"), "{}", route);
    }
    assert!(scratch_is_empty(&state));
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let (state, _dir) = test_state(untouchable_engines());

    let boundary = "fabstir-test-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/ocr/predict-by-file")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = create_app(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_undecodable_upload_rejected() {
    let (state, _dir) = test_state(untouchable_engines());

    let response = create_app(state)
        .oneshot(upload_request("/ocr/predict-by-file", "fake.png", b"not an image"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unconfigured_engines_unavailable() {
    let (state, _dir) = test_state(EngineSet::default());

    for route in ["/ocr", "/layout", "/table"] {
        let response = create_app(state.clone())
            .oneshot(upload_request(
                &format!("{}/predict-by-file", route),
                "scan.png",
                &png_bytes(4, 4),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "{}", route);
        assert!(detail_of(response).await.contains("not available"));
    }
}
