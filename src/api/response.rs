// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Response envelopes and file attachments

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Envelope of the path and base64 routes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestfulModel<T> {
    pub resultcode: u16,
    pub message: String,
    pub data: T,
}

impl<T> RestfulModel<T> {
    pub fn success(data: T) -> Self {
        Self {
            resultcode: 200,
            message: "Success".to_string(),
            data,
        }
    }
}

/// General purpose `{code, message, data}` envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 200,
            message: "Success".to_string(),
            data: Some(data),
        }
    }

    /// 400 envelope; `message` defaults to `BAD REQUEST`
    pub fn bad_request(message: Option<&str>, data: Option<T>) -> Self {
        Self {
            code: 400,
            message: message.unwrap_or("BAD REQUEST").to_string(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// A generated file returned as a download
#[derive(Debug, Clone)]
pub struct Attachment {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

impl Attachment {
    pub fn new(bytes: Vec<u8>, content_type: &'static str, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type,
            filename: filename.into(),
        }
    }
}

impl IntoResponse for Attachment {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, self.content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={}", self.filename),
                ),
            ],
            self.bytes,
        )
            .into_response()
    }
}
