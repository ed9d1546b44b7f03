// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, warn};

use crate::recovery::RecoveryError;
use crate::storage::ScratchError;
use crate::vision::{EngineError, ImageError};

/// Error body returned by every route
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    InvalidRequest(String),
    NotFound(String),
    ServiceUnavailable(String),
    Timeout(String),
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let detail = match self {
            ApiError::InvalidRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::Timeout(msg)
            | ApiError::InternalError(msg) => msg.clone(),
        };
        ErrorResponse { detail }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::ServiceUnavailable(_) => 503,
            ApiError::Timeout(_) => 504,
            ApiError::InternalError(_) => 500,
        }
    }

    /// 503 for a route whose engine was not configured
    pub fn engine_unavailable(engine: &str) -> Self {
        ApiError::ServiceUnavailable(format!("{} engine not available", engine))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::Timeout(msg) => write!(f, "Timed out: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("❌ {}", self);
        } else {
            warn!("{}", self);
        }
        (status, Json(self.to_response())).into_response()
    }
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::NotFound(path) => ApiError::NotFound(format!("Image not found: {}", path)),
            ImageError::Io(e) => ApiError::InternalError(format!("Failed to read image: {}", e)),
            ImageError::EncodeFailed(msg) => {
                ApiError::InternalError(format!("Failed to encode image: {}", msg))
            }
            other => ApiError::InvalidRequest(format!("Invalid image: {}", other)),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Timeout(_) => ApiError::Timeout(err.to_string()),
            other => ApiError::InternalError(format!("Inference failed: {}", other)),
        }
    }
}

impl From<RecoveryError> for ApiError {
    fn from(err: RecoveryError) -> Self {
        ApiError::InternalError(format!("Failed to generate output: {}", err))
    }
}

impl From<ScratchError> for ApiError {
    fn from(err: ScratchError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}
