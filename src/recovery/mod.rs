// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Document recovery and artifact generation
//!
//! Turns engine output into downloadable files:
//! - `.docx` from OCR lines or from sorted layout regions
//! - per-table `.xlsx` exports written next to the request's input
//! - `.zip` archives of those exports

pub mod archive;
pub mod convert;
pub mod docx;
pub mod html_table;
pub mod layout_sort;
pub mod structure;
pub mod xlsx;

use thiserror::Error;

use crate::vision::ImageError;

pub use archive::{collect_spreadsheets, zip_files, ZIP_CONTENT_TYPE};
pub use convert::{layout_to_docx, text_to_docx};
pub use docx::{DocxBuilder, DOCX_CONTENT_TYPE};
pub use html_table::{parse_table_html, GridCell, TableGrid};
pub use layout_sort::sort_layout_boxes;
pub use structure::save_structure;

#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("zip write failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("spreadsheet write failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("image processing failed: {0}")]
    Image(#[from] ImageError),

    #[error("result serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
