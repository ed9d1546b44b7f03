// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image decoding and encoding helpers shared by every intake route

use std::io::Cursor;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use thiserror::Error;

/// Maximum decoded image size (10MB)
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Failed to encode image: {0}")]
    EncodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,

    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Failed to read image file: {0}")]
    Io(#[from] std::io::Error),
}

/// Metadata captured while decoding
#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub size_bytes: usize,
}

/// Decode a base64 payload, tolerating a `data:image/...;base64,` prefix.
///
/// The payload never touches disk.
pub fn decode_base64_image(base64_str: &str) -> Result<(DynamicImage, ImageInfo), ImageError> {
    let payload = strip_data_url(base64_str.trim());
    if payload.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let bytes = STANDARD.decode(payload)?;
    decode_image_bytes(&bytes)
}

/// Decode raw image bytes (uploads, downloads, files read from disk)
pub fn decode_image_bytes(bytes: &[u8]) -> Result<(DynamicImage, ImageInfo), ImageError> {
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ImageError::TooLarge(bytes.len(), MAX_IMAGE_BYTES));
    }

    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let format = detect_format(bytes)?;

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    let info = ImageInfo {
        width: img.width(),
        height: img.height(),
        format,
        size_bytes: bytes.len(),
    };

    Ok((img, info))
}

/// Load and decode an image from a local path
pub async fn load_image_file(path: &Path) -> Result<(DynamicImage, ImageInfo), ImageError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ImageError::NotFound(path.display().to_string()))
        }
        Err(e) => return Err(ImageError::Io(e)),
    };
    decode_image_bytes(&bytes)
}

/// Detect image format from magic bytes
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    if bytes.len() < 4 {
        return Err(ImageError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // GIF87a / GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok(ImageFormat::Gif),

        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),

        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Ok(ImageFormat::Tiff),

        _ => Err(ImageError::UnsupportedFormat),
    }
}

/// Encode an image in the given format
pub fn encode_image(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    // JPEG has no alpha channel
    let result = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(image.to_rgb8()).write_to(&mut buffer, format)
    } else {
        image.write_to(&mut buffer, format)
    };
    result.map_err(|e| ImageError::EncodeFailed(e.to_string()))?;
    Ok(buffer.into_inner())
}

/// PNG bytes, base64 encoded, as sent to inference sidecars
pub fn encode_png_base64(image: &DynamicImage) -> Result<String, ImageError> {
    Ok(STANDARD.encode(encode_image(image, ImageFormat::Png)?))
}

/// Crop `[x0, y0, x1, y1]`, clamped to the image bounds.
///
/// Returns `None` when the clamped box is empty.
pub fn crop_to_bbox(image: &DynamicImage, bbox: [i32; 4]) -> Option<DynamicImage> {
    let clamp_x = |v: i32| v.clamp(0, image.width() as i32) as u32;
    let clamp_y = |v: i32| v.clamp(0, image.height() as i32) as u32;

    let (x0, y0) = (clamp_x(bbox[0]), clamp_y(bbox[1]));
    let (x1, y1) = (clamp_x(bbox[2]), clamp_y(bbox[3]));
    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    Some(image.crop_imm(x0, y0, x1 - x0, y1 - y0))
}

fn strip_data_url(payload: &str) -> &str {
    if payload.starts_with("data:") {
        if let Some(idx) = payload.find(";base64,") {
            return &payload[idx + ";base64,".len()..];
        }
    }
    payload
}
