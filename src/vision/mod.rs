// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision engines and image handling
//!
//! This module provides:
//! - Image decoding for every intake route
//! - The inference engine contract and its concurrency policy
//! - Sidecar-backed OCR, layout and table engines

pub mod engine;
pub mod image_utils;
pub mod model_manager;
pub mod remote;
pub mod types;

pub use engine::{EngineError, EngineHandle, InferenceEngine};
pub use image_utils::{
    decode_base64_image, decode_image_bytes, detect_format, load_image_file, ImageError, ImageInfo,
};
pub use model_manager::{EngineAvailability, EngineConfig, EngineSet};
pub use remote::{EngineTask, RemoteEngine};
pub use types::{ColumnLayout, LayoutRegion, RegionContent, RegionKind, TableContent, TextLine};
