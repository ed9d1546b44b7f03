// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Inference engine contract and shared access policy
//!
//! Recognition engines are opaque: an image goes in, a structured result
//! comes out. Handlers never hold an engine directly; they go through an
//! [`EngineHandle`], which bounds how many calls run at once and how long a
//! single call may take.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use image::DynamicImage;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine request failed: {0}")]
    Transport(String),

    #[error("engine returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("engine response could not be parsed: {0}")]
    InvalidResponse(String),

    #[error("failed to prepare image for engine: {0}")]
    Image(String),

    #[error("inference timed out after {0:?}")]
    Timeout(Duration),

    #[error("engine is shutting down")]
    Closed,
}

/// A pretrained recognition engine
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    type Output: Send;

    /// Short name used in logs and health output
    fn name(&self) -> &str {
        "engine"
    }

    async fn infer(&self, image: &DynamicImage) -> Result<Self::Output, EngineError>;

    /// Whether the engine is ready to serve
    async fn health_check(&self) -> bool {
        true
    }
}

/// Shared, rate-limited access to one engine
pub struct EngineHandle<T> {
    engine: Arc<dyn InferenceEngine<Output = T>>,
    permits: Arc<Semaphore>,
    timeout: Option<Duration>,
}

impl<T> Clone for EngineHandle<T> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            permits: self.permits.clone(),
            timeout: self.timeout,
        }
    }
}

impl<T: Send> EngineHandle<T> {
    pub fn new(
        engine: Arc<dyn InferenceEngine<Output = T>>,
        max_concurrent: usize,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            engine,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            timeout,
        }
    }

    pub fn name(&self) -> &str {
        self.engine.name()
    }

    pub async fn health_check(&self) -> bool {
        self.engine.health_check().await
    }

    /// Calls currently allowed to start without waiting
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run inference once a permit is free
    pub async fn infer(&self, image: &DynamicImage) -> Result<T, EngineError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| EngineError::Closed)?;

        let start = Instant::now();
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, self.engine.infer(image)).await {
                Ok(result) => result,
                Err(_) => Err(EngineError::Timeout(limit)),
            },
            None => self.engine.infer(image).await,
        };

        match &result {
            Ok(_) => debug!(
                "{} inference finished in {}ms",
                self.name(),
                start.elapsed().as_millis()
            ),
            Err(e) => warn!("{} inference failed: {}", self.name(), e),
        }

        result
    }
}
