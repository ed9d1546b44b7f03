// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::future::Future;
use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::errors::ApiError;
use super::{layout, ocr, table};
use crate::config::{ServiceConfig, DEFAULT_MAX_UPLOAD_BYTES};
use crate::recovery::RecoveryError;
use crate::storage::ScratchSpace;
use crate::version;
use crate::vision::{EngineAvailability, EngineSet};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub engines: EngineSet,
    pub scratch: ScratchSpace,
    pub http_client: reqwest::Client,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// State with a default HTTP client, used by tests and embedders
    pub fn new(engines: EngineSet, scratch: ScratchSpace) -> Self {
        Self {
            engines,
            scratch,
            http_client: reqwest::Client::new(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn from_config(config: &ServiceConfig, engines: EngineSet) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .build()?;

        Ok(Self {
            engines,
            scratch: ScratchSpace::new(&config.scratch_dir),
            http_client,
            max_upload_bytes: config.max_upload_bytes,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub features: Vec<String>,
    pub engines: EngineAvailability,
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/health", get(health_handler))
        .nest("/ocr", ocr::routes())
        .nest("/layout", layout::routes())
        .nest("/table", table::routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(
    addr: SocketAddr,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("🚀 {} listening on {}", version::get_version_string(), addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: version::VERSION.to_string(),
        features: version::FEATURES.iter().map(|f| f.to_string()).collect(),
        engines: state.engines.availability(),
    })
}

/// Run CPU- or disk-bound artifact work off the async runtime
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> std::result::Result<T, RecoveryError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::InternalError(format!("Artifact task failed: {}", e)))?
        .map_err(ApiError::from)
}
