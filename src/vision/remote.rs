// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Inference sidecar client
//!
//! The pretrained engines run out of process. A sidecar exposes
//! `POST /predict` taking a base64 PNG and returning the structured result
//! as JSON, plus `GET /health`.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use super::engine::{EngineError, InferenceEngine};
use super::image_utils::encode_png_base64;

/// Which model a sidecar request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineTask {
    Ocr,
    Layout,
    Table,
}

impl EngineTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineTask::Ocr => "ocr",
            EngineTask::Layout => "layout",
            EngineTask::Table => "table",
        }
    }
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    task: EngineTask,
    lang: &'a str,
    image: String,
}

/// Engine backed by an inference sidecar
pub struct RemoteEngine<T> {
    client: Client,
    endpoint: String,
    task: EngineTask,
    language: String,
    _output: PhantomData<fn() -> T>,
}

impl<T> RemoteEngine<T> {
    pub fn new(
        endpoint: &str,
        task: EngineTask,
        language: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!(
            "{} engine configured: endpoint={}, lang={}",
            task.as_str(),
            endpoint,
            language
        );

        Ok(Self {
            client,
            endpoint,
            task,
            language: language.to_string(),
            _output: PhantomData,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl<T> InferenceEngine for RemoteEngine<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = T;

    fn name(&self) -> &str {
        self.task.as_str()
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.endpoint))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("{} sidecar health check failed: {}", self.task.as_str(), e);
                false
            }
        }
    }

    async fn infer(&self, image: &DynamicImage) -> Result<T, EngineError> {
        let payload = encode_png_base64(image).map_err(|e| EngineError::Image(e.to_string()))?;
        let request = PredictRequest {
            task: self.task,
            lang: &self.language,
            image: payload,
        };

        let response = self
            .client
            .post(format!("{}/predict", self.endpoint))
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))
    }
}
