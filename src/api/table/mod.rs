// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Table extraction routes
//!
//! File and URL routes answer with a `.zip` holding one `.xlsx` per table
//! region found on the page.

pub mod handler;

use axum::{
    routing::{get, post},
    Router,
};

use crate::api::http_server::AppState;

pub use handler::{predict_by_base64, predict_by_file, predict_by_path, predict_by_url};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/predict-by-path", get(predict_by_path))
        .route("/predict-by-base64", post(predict_by_base64))
        .route("/predict-by-file", post(predict_by_file))
        .route("/predict-by-url", post(predict_by_url))
}
