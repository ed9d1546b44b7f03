// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Fabstir OCR Node

/// Full version string with feature description
pub const VERSION: &str = "v1.0.0-document-recovery-2025-11-03";

/// Semantic version number
pub const VERSION_NUMBER: &str = "1.0.0";

/// Major version number
pub const VERSION_MAJOR: u32 = 1;

/// Minor version number
pub const VERSION_MINOR: u32 = 0;

/// Patch version number
pub const VERSION_PATCH: u32 = 0;

/// Build date
pub const BUILD_DATE: &str = "2025-11-03";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "ocr",
    "layout-recovery",
    "table-export",
    "docx-output",
    "xlsx-output",
    "sidecar-engines",
    "per-request-workspaces",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Fabstir OCR Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}
