// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Zip archives of exported spreadsheets

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::RecoveryError;

pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// `.xlsx` files directly inside `dir`, sorted by name.
///
/// A missing directory yields an empty list.
pub fn collect_spreadsheets(dir: &Path) -> Result<Vec<PathBuf>, RecoveryError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_xlsx = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("xlsx"))
            .unwrap_or(false);
        if is_xlsx && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Zip `files`, each stored under its bare file name
pub fn zip_files(files: &[PathBuf]) -> Result<Vec<u8>, RecoveryError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        zip.start_file(name, options)?;
        zip.write_all(&fs::read(path)?)?;
    }

    Ok(zip.finish()?.into_inner())
}
