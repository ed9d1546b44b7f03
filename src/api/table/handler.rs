// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Table endpoint handlers

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
use crate::recovery::{collect_spreadsheets, save_structure, zip_files, ZIP_CONTENT_TYPE};
use crate::vision::{
    decode_base64_image, decode_image_bytes, load_image_file, EngineHandle, LayoutRegion,
};

fn table_engine(state: &AppState) -> Result<&EngineHandle<Vec<LayoutRegion>>, ApiError> {
    state
        .engines
        .table
        .as_ref()
        .ok_or_else(|| ApiError::engine_unavailable("Table"))
}

async fn analyze(state: &AppState, image: &DynamicImage) -> Result<Vec<LayoutRegion>, ApiError> {
    let regions = table_engine(state)?.infer(image).await?;
    debug!("Table engine found {} regions", regions.len());
    Ok(regions)
}

/// Export the regions into a fresh workspace and zip the spreadsheets.
///
/// The workspace is removed before returning, whatever the outcome.
async fn export_tables(
    state: &AppState,
    image: DynamicImage,
    regions: Vec<LayoutRegion>,
    base: String,
) -> Result<Attachment, ApiError> {
    let workspace = state.scratch.open_workspace()?;
    let folder = workspace.path().to_path_buf();
    let img_name = base.clone();

    let archive = run_blocking(move || {
        let output_dir = save_structure(&image, &regions, &folder, &img_name)?;
        let spreadsheets = collect_spreadsheets(&output_dir)?;
        debug!("Zipping {} spreadsheets", spreadsheets.len());
        zip_files(&spreadsheets)
    })
    .await;
    workspace.close();

    let bytes = archive?;
    info!("📦 Table archive {}.zip ({} bytes)", base, bytes.len());
    Ok(Attachment::new(bytes, ZIP_CONTENT_TYPE, format!("{}.zip", base)))
}

/// GET /table/predict-by-path?image_path=...
pub async fn predict_by_path(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<RestfulModel<Vec<LayoutRegion>>>, ApiError> {
    let (image, _) = load_image_file(Path::new(&query.image_path)).await?;
    let regions = analyze(&state, &image).await?;
    Ok(Json(RestfulModel::success(regions)))
}

/// POST /table/predict-by-base64
pub async fn predict_by_base64(
    State(state): State<AppState>,
    Json(body): Json<Base64PostModel>,
) -> Result<Json<RestfulModel<Vec<LayoutRegion>>>, ApiError> {
    let (image, _) = decode_base64_image(&body.base64_str)?;
    let regions = analyze(&state, &image).await?;
    Ok(Json(RestfulModel::success(regions)))
}

/// POST /table/predict-by-file (multipart `file`)
pub async fn predict_by_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Attachment, ApiError> {
    let upload = read_upload(multipart).await?;
    if !has_image_extension(&upload.filename) {
        return Err(ApiError::InvalidRequest(UPLOAD_FORMAT_MESSAGE.to_string()));
    }

    table_engine(&state)?;
    let (image, _) = decode_image_bytes(&upload.data)?;
    let regions = analyze(&state, &image).await?;
    export_tables(&state, image, regions, filename_base(&upload.filename)).await
}

/// POST /table/predict-by-url?url=...
pub async fn predict_by_url(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Result<Attachment, ApiError> {
    if !has_image_extension(&query.url) {
        return Err(ApiError::InvalidRequest(URL_FORMAT_MESSAGE.to_string()));
    }

    table_engine(&state)?;
    let url = parse_image_url(&query.url)?;
    let data = fetch_image(&state.http_client, url).await?;
    let (image, _) = decode_image_bytes(&data)?;
    let regions = analyze(&state, &image).await?;
    export_tables(&state, image, regions, filename_base(&query.url)).await
}
