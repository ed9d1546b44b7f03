// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request types shared by the `/ocr`, `/layout` and `/table` routes

use serde::{Deserialize, Serialize};

/// Body of every `predict-by-base64` route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Base64PostModel {
    /// Base64 image data, optionally with a `data:image/...;base64,` prefix
    pub base64_str: String,
}

/// Query of every `predict-by-path` route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathQuery {
    /// Path of an image readable by the node
    pub image_path: String,
}

/// Query of every `predict-by-url` route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlQuery {
    pub url: String,
}
