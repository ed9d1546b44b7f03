// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod http_server;
pub mod intake;
pub mod layout;
pub mod ocr;
pub mod request;
pub mod response;
pub mod table;

pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_app, start_server, AppState, HealthResponse};
pub use request::{Base64PostModel, PathQuery, UrlQuery};
pub use response::{ApiResponse, Attachment, RestfulModel};
