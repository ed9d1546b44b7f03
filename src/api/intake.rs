// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request intake
//!
//! Validates the file name of uploads and URLs, reads multipart uploads and
//! downloads remote images. Everything stays in memory; the handlers decide
//! whether a file needs to land in a request workspace.

use axum_extra::extract::Multipart;
use bytes::{Bytes, BytesMut};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use super::errors::ApiError;
use crate::vision::image_utils::MAX_IMAGE_BYTES;
use crate::vision::ImageError;

pub const UPLOAD_FORMAT_MESSAGE: &str = "Please upload images in .jpg or .png format";
pub const URL_FORMAT_MESSAGE: &str = "Please provide URLs to images in .jpg or .png format";
pub const URL_UNREACHABLE_MESSAGE: &str = "Unable to access the provided URL";

const FALLBACK_BASE: &str = "image";

/// True when `name` ends in `.jpg` or `.png`, ignoring case
pub fn has_image_extension(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".jpg") || lower.ends_with(".png")
}

/// Base name used for generated files: last path segment up to its first
/// `.`, restricted to `[A-Za-z0-9_-]`.
pub fn filename_base(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or("");
    let stem = last.split('.').next().unwrap_or("");
    let base: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if base.is_empty() {
        FALLBACK_BASE.to_string()
    } else {
        base
    }
}

/// A file received through a multipart upload
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub data: Bytes,
}

/// Read the first multipart field that carries a file name
pub async fn read_upload(mut multipart: Multipart) -> Result<UploadedImage, ApiError> {
    loop {
        let field = multipart.next_field().await.map_err(|e| {
            ApiError::InvalidRequest(format!("Malformed multipart body: {}", e))
        })?;

        let Some(field) = field else {
            return Err(ApiError::InvalidRequest("No file uploaded".to_string()));
        };

        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to read upload: {}", e)))?;

        debug!("Received upload {} ({} bytes)", filename, data.len());
        return Ok(UploadedImage { filename, data });
    }
}

/// Parse an image URL; only `http` and `https` can be fetched
pub fn parse_image_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        warn!("Rejected URL {}: {}", raw, e);
        ApiError::InvalidRequest(URL_UNREACHABLE_MESSAGE.to_string())
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => {
            warn!("Rejected URL {} with scheme {}", raw, scheme);
            Err(ApiError::InvalidRequest(URL_UNREACHABLE_MESSAGE.to_string()))
        }
    }
}

/// Download `url`; any transport failure or non-200 answer is a client error.
///
/// The body is read chunk by chunk and abandoned as soon as it exceeds
/// [`MAX_IMAGE_BYTES`].
pub async fn fetch_image(client: &Client, url: Url) -> Result<Bytes, ApiError> {
    let mut response = client.get(url.clone()).send().await.map_err(|e| {
        warn!("Fetching {} failed: {}", url, e);
        ApiError::InvalidRequest(URL_UNREACHABLE_MESSAGE.to_string())
    })?;

    if response.status() != StatusCode::OK {
        warn!("Fetching {} returned {}", url, response.status());
        return Err(ApiError::InvalidRequest(URL_UNREACHABLE_MESSAGE.to_string()));
    }

    if let Some(declared) = response.content_length() {
        let declared = usize::try_from(declared).unwrap_or(usize::MAX);
        if declared > MAX_IMAGE_BYTES {
            return Err(too_large(&url, declared));
        }
    }

    let mut data = BytesMut::new();
    while let Some(chunk) = response.chunk().await.map_err(|e| {
        warn!("Reading body of {} failed: {}", url, e);
        ApiError::InvalidRequest(URL_UNREACHABLE_MESSAGE.to_string())
    })? {
        if data.len() + chunk.len() > MAX_IMAGE_BYTES {
            return Err(too_large(&url, data.len() + chunk.len()));
        }
        data.extend_from_slice(&chunk);
    }

    debug!("Downloaded {} ({} bytes)", url, data.len());
    Ok(data.freeze())
}

fn too_large(url: &Url, size: usize) -> ApiError {
    warn!("Download of {} stopped at {} bytes", url, size);
    ImageError::TooLarge(size, MAX_IMAGE_BYTES).into()
}
