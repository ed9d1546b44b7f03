// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR endpoint handlers

use std::path::Path;

use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::Multipart;
use image::DynamicImage;
use tracing::{debug, info};

use crate::api::errors::ApiError;
use crate::api::http_server::{run_blocking, AppState};
use crate::api::intake::{
    fetch_image, filename_base, has_image_extension, parse_image_url, read_upload,
    UPLOAD_FORMAT_MESSAGE, URL_FORMAT_MESSAGE,
};
use crate::api::request::{Base64PostModel, PathQuery, UrlQuery};
use crate::api::response::{Attachment, RestfulModel};
use crate::recovery::{text_to_docx, DOCX_CONTENT_TYPE};
use crate::vision::{
    decode_base64_image, decode_image_bytes, load_image_file, EngineHandle, TextLine,
};

fn ocr_engine(state: &AppState) -> Result<&EngineHandle<Vec<TextLine>>, ApiError> {
    state
        .engines
        .ocr
        .as_ref()
        .ok_or_else(|| ApiError::engine_unavailable("OCR"))
}

async fn recognize(state: &AppState, image: &DynamicImage) -> Result<Vec<TextLine>, ApiError> {
    let lines = ocr_engine(state)?.infer(image).await?;
    debug!("OCR produced {} lines", lines.len());
    Ok(lines)
}

async fn text_document(lines: Vec<TextLine>, base: &str) -> Result<Attachment, ApiError> {
    let bytes = run_blocking(move || text_to_docx(&lines)).await?;
    info!("📄 OCR document {}.docx ({} bytes)", base, bytes.len());
    Ok(Attachment::new(bytes, DOCX_CONTENT_TYPE, format!("{}.docx", base)))
}

/// GET /ocr/predict-by-path?image_path=...
pub async fn predict_by_path(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<RestfulModel<Vec<TextLine>>>, ApiError> {
    let (image, _) = load_image_file(Path::new(&query.image_path)).await?;
    let lines = recognize(&state, &image).await?;
    Ok(Json(RestfulModel::success(lines)))
}

/// POST /ocr/predict-by-base64
pub async fn predict_by_base64(
    State(state): State<AppState>,
    Json(body): Json<Base64PostModel>,
) -> Result<Json<RestfulModel<Vec<TextLine>>>, ApiError> {
    let (image, info) = decode_base64_image(&body.base64_str)?;
    debug!("Decoded image: {}x{}", info.width, info.height);
    let lines = recognize(&state, &image).await?;
    Ok(Json(RestfulModel::success(lines)))
}

/// POST /ocr/predict-by-file (multipart `file`)
///
/// Returns the recognised strings, joined by single spaces, as the only
/// paragraph of a `.docx` named after the upload.
pub async fn predict_by_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Attachment, ApiError> {
    let upload = read_upload(multipart).await?;
    if !has_image_extension(&upload.filename) {
        return Err(ApiError::InvalidRequest(UPLOAD_FORMAT_MESSAGE.to_string()));
    }

    ocr_engine(&state)?;
    let (image, _) = decode_image_bytes(&upload.data)?;
    let lines = recognize(&state, &image).await?;
    text_document(lines, &filename_base(&upload.filename)).await
}

/// GET|POST /ocr/predict-by-url?url=...
pub async fn predict_by_url(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Result<Attachment, ApiError> {
    if !has_image_extension(&query.url) {
        return Err(ApiError::InvalidRequest(URL_FORMAT_MESSAGE.to_string()));
    }

    ocr_engine(&state)?;
    let url = parse_image_url(&query.url)?;
    let data = fetch_image(&state.http_client, url).await?;
    let (image, _) = decode_image_bytes(&data)?;
    let lines = recognize(&state, &image).await?;
    text_document(lines, &filename_base(&query.url)).await
}
