// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration
//!
//! Every option is a command-line flag backed by an environment variable,
//! so the node can be configured from a `.env` file alone.

use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;

use crate::vision::EngineConfig;

/// Default request body limit (20MB, multipart overhead included)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Fabstir OCR Node
#[derive(Parser, Debug, Clone)]
#[command(name = "fabstir-ocr-node")]
#[command(about = "OCR, layout recovery and table extraction over HTTP", long_about = None)]
pub struct ServiceConfig {
    /// Interface to bind
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "API_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Model language, fixed for the process lifetime
    #[arg(long, env = "OCR_LANGUAGE", default_value = "en")]
    pub ocr_language: String,

    /// Root directory for per-request scratch files
    #[arg(long, env = "SCRATCH_DIR", default_value = "./temp")]
    pub scratch_dir: PathBuf,

    /// Text OCR sidecar base URL
    #[arg(long, env = "OCR_ENGINE_URL")]
    pub ocr_engine_url: Option<String>,

    /// Layout structure sidecar base URL
    #[arg(long, env = "LAYOUT_ENGINE_URL")]
    pub layout_engine_url: Option<String>,

    /// Table structure sidecar base URL
    #[arg(long, env = "TABLE_ENGINE_URL")]
    pub table_engine_url: Option<String>,

    /// Inference calls allowed in flight per engine
    #[arg(long, env = "MAX_CONCURRENT_INFERENCES", default_value_t = 4)]
    pub max_concurrent_inferences: usize,

    /// Per-call inference limit in seconds (0 disables)
    #[arg(long, env = "INFERENCE_TIMEOUT_SECS", default_value_t = 120)]
    pub inference_timeout_secs: u64,

    /// Timeout for downloading images by URL
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 30)]
    pub fetch_timeout_secs: u64,

    /// Maximum request body size in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            ocr_language: "en".to_string(),
            scratch_dir: PathBuf::from("./temp"),
            ocr_engine_url: None,
            layout_engine_url: None,
            table_engine_url: None,
            max_concurrent_inferences: 4,
            inference_timeout_secs: 120,
            fetch_timeout_secs: 30,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServiceConfig {
    /// Bind address; `API_HOST` may be an IPv4 or IPv6 literal (brackets
    /// optional) or a host name
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let host = self.host.trim().trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, self.port));
        }
        (host, self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| anyhow!("API_HOST {} does not resolve to an address", self.host))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            ocr_endpoint: non_empty(&self.ocr_engine_url),
            layout_endpoint: non_empty(&self.layout_engine_url),
            table_endpoint: non_empty(&self.table_engine_url),
            language: self.ocr_language.clone(),
            max_concurrent_inferences: self.max_concurrent_inferences,
            inference_timeout: (self.inference_timeout_secs > 0)
                .then(|| Duration::from_secs(self.inference_timeout_secs)),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
