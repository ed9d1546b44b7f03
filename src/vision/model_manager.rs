// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Engine set construction
//!
//! The three recognition engines are built once at startup and shared by all
//! requests. An engine without a configured endpoint is left out; the routes
//! depending on it answer 503.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::engine::{EngineHandle, InferenceEngine};
use super::remote::{EngineTask, RemoteEngine};
use super::types::{LayoutRegion, TextLine};

/// Configuration for connecting the engines
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub ocr_endpoint: Option<String>,
    pub layout_endpoint: Option<String>,
    pub table_endpoint: Option<String>,
    /// Model language, fixed for the process lifetime
    pub language: String,
    pub max_concurrent_inferences: usize,
    pub inference_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ocr_endpoint: None,
            layout_endpoint: None,
            table_endpoint: None,
            language: "en".to_string(),
            max_concurrent_inferences: 4,
            inference_timeout: Some(Duration::from_secs(120)),
        }
    }
}

/// Availability of each engine, reported by `/health`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineAvailability {
    pub ocr: bool,
    pub layout: bool,
    pub table: bool,
}

/// The engines shared by the request handlers
#[derive(Clone, Default)]
pub struct EngineSet {
    pub ocr: Option<EngineHandle<Vec<TextLine>>>,
    pub layout: Option<EngineHandle<Vec<LayoutRegion>>>,
    pub table: Option<EngineHandle<Vec<LayoutRegion>>>,
}

impl EngineSet {
    /// Connect sidecar engines for every configured endpoint
    pub fn from_config(config: &EngineConfig) -> anyhow::Result<Self> {
        // The handle enforces the inference timeout; reqwest only backstops it
        let client_timeout = config
            .inference_timeout
            .map(|t| t + Duration::from_secs(5))
            .unwrap_or(Duration::from_secs(600));

        let mut set = EngineSet::default();

        if let Some(ref endpoint) = config.ocr_endpoint {
            let engine: Arc<dyn InferenceEngine<Output = Vec<TextLine>>> = Arc::new(
                RemoteEngine::new(endpoint, EngineTask::Ocr, &config.language, client_timeout)?,
            );
            set.ocr = Some(Self::handle(config, engine));
        } else {
            tracing::warn!("⚠️ OCR_ENGINE_URL not set, /ocr routes disabled");
        }

        if let Some(ref endpoint) = config.layout_endpoint {
            let engine: Arc<dyn InferenceEngine<Output = Vec<LayoutRegion>>> =
                Arc::new(RemoteEngine::new(
                    endpoint,
                    EngineTask::Layout,
                    &config.language,
                    client_timeout,
                )?);
            set.layout = Some(Self::handle(config, engine));
        } else {
            tracing::warn!("⚠️ LAYOUT_ENGINE_URL not set, /layout routes disabled");
        }

        if let Some(ref endpoint) = config.table_endpoint {
            let engine: Arc<dyn InferenceEngine<Output = Vec<LayoutRegion>>> =
                Arc::new(RemoteEngine::new(
                    endpoint,
                    EngineTask::Table,
                    &config.language,
                    client_timeout,
                )?);
            set.table = Some(Self::handle(config, engine));
        } else {
            tracing::warn!("⚠️ TABLE_ENGINE_URL not set, /table routes disabled");
        }

        Ok(set)
    }

    /// Wrap an engine with the configured access policy
    pub fn handle<T: Send>(
        config: &EngineConfig,
        engine: Arc<dyn InferenceEngine<Output = T>>,
    ) -> EngineHandle<T> {
        EngineHandle::new(
            engine,
            config.max_concurrent_inferences,
            config.inference_timeout,
        )
    }

    pub fn with_ocr(mut self, handle: EngineHandle<Vec<TextLine>>) -> Self {
        self.ocr = Some(handle);
        self
    }

    pub fn with_layout(mut self, handle: EngineHandle<Vec<LayoutRegion>>) -> Self {
        self.layout = Some(handle);
        self
    }

    pub fn with_table(mut self, handle: EngineHandle<Vec<LayoutRegion>>) -> Self {
        self.table = Some(handle);
        self
    }

    /// Probe every configured engine; unconfigured engines report false
    pub async fn check_health(&self) -> EngineAvailability {
        EngineAvailability {
            ocr: healthy(&self.ocr).await,
            layout: healthy(&self.layout).await,
            table: healthy(&self.table).await,
        }
    }

    pub fn availability(&self) -> EngineAvailability {
        EngineAvailability {
            ocr: self.ocr.is_some(),
            layout: self.layout.is_some(),
            table: self.table.is_some(),
        }
    }
}

async fn healthy<T: Send>(handle: &Option<EngineHandle<T>>) -> bool {
    match handle {
        Some(handle) => handle.health_check().await,
        None => false,
    }
}
