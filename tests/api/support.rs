// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared fixtures for the route tests: in-process engines, images,
//! multipart bodies and a local image server for the URL routes.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use fabstir_ocr_node::{
    api::AppState,
    storage::ScratchSpace,
    vision::image_utils::MAX_IMAGE_BYTES,
    vision::{
        EngineError, EngineHandle, EngineSet, InferenceEngine, LayoutRegion, RegionContent,
        TableContent, TextLine,
    },
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::{Cursor, Read};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

pub const QUAD: [[f32; 2]; 4] = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]];

/// Engine returning a fixed result and counting its calls
pub struct FakeEngine<T> {
    pub calls: Arc<AtomicUsize>,
    pub output: T,
}

#[async_trait]
impl<T> InferenceEngine for FakeEngine<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = T;

    fn name(&self) -> &str {
        "fake"
    }

    async fn infer(&self, _image: &DynamicImage) -> Result<T, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}

/// Engine whose every call fails
pub struct BrokenEngine;

#[async_trait]
impl InferenceEngine for BrokenEngine {
    type Output = Vec<TextLine>;

    async fn infer(&self, _image: &DynamicImage) -> Result<Vec<TextLine>, EngineError> {
        Err(EngineError::Status {
            status: 500,
            body: "model crashed".to_string(),
        })
    }
}

pub fn counting<T>(output: T) -> (EngineHandle<T>, Arc<AtomicUsize>)
where
    T: Clone + Send + Sync + 'static,
{
    let calls = Arc::new(AtomicUsize::new(0));
    let engine: Arc<dyn InferenceEngine<Output = T>> = Arc::new(FakeEngine {
        calls: calls.clone(),
        output,
    });
    (EngineHandle::new(engine, 2, None), calls)
}

pub fn ocr_lines(texts: &[&str]) -> Vec<TextLine> {
    texts.iter().map(|t| TextLine::new(*t, 0.95, QUAD)).collect()
}

pub fn text_region(label: &str, bbox: [i32; 4], texts: &[&str]) -> LayoutRegion {
    LayoutRegion {
        region_type: label.to_string(),
        bbox,
        img_idx: 0,
        res: RegionContent::Lines(ocr_lines(texts)),
        layout: None,
    }
}

pub fn table_region(bbox: [i32; 4], html: &str) -> LayoutRegion {
    LayoutRegion {
        region_type: "table".to_string(),
        bbox,
        img_idx: 0,
        res: RegionContent::Table(TableContent {
            html: html.to_string(),
            cell_bbox: vec![],
        }),
        layout: None,
    }
}

/// State over a fresh scratch root inside a temp dir
pub fn test_state(engines: EngineSet) -> (AppState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let scratch = ScratchSpace::new(dir.path().join("temp"));
    scratch.purge().unwrap();
    (AppState::new(engines, scratch), dir)
}

pub fn scratch_is_empty(state: &AppState) -> bool {
    std::fs::read_dir(state.scratch.root())
        .unwrap()
        .next()
        .is_none()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])));
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    std::fs::write(path, png_bytes(width, height)).unwrap();
}

/// Multipart request carrying one `file` field
pub fn upload_request(uri: &str, filename: &str, data: &[u8]) -> Request<Body> {
    let boundary = "fabstir-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(uri: &str, json: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// `word/document.xml` of a generated `.docx`
pub fn docx_document_xml(bytes: Vec<u8>) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

pub fn zip_entry_names(bytes: Vec<u8>) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut names: Vec<String> = archive.file_names().map(String::from).collect();
    names.sort();
    names
}

/// Serves `/scan.png` (and `/page.jpg`) with `png`, `/gone.png` with 404
/// and `/huge.png` with a body past the image size limit
pub async fn spawn_image_server(png: Vec<u8>) -> SocketAddr {
    let served = png.clone();
    let app = Router::new()
        .route(
            "/scan.png",
            get(move || {
                let png = png.clone();
                async move { ([(header::CONTENT_TYPE, "image/png")], png) }
            }),
        )
        .route(
            "/page.jpg",
            get(move || {
                let png = served.clone();
                async move { ([(header::CONTENT_TYPE, "image/png")], png) }
            }),
        )
        .route("/gone.png", get(|| async { StatusCode::NOT_FOUND }))
        .route(
            "/huge.png",
            get(|| async { vec![0u8; MAX_IMAGE_BYTES + 1] }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
