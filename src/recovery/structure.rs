// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-image structure output
//!
//! Writes the layout/table result of one image into `<folder>/<name>/`:
//! one `.xlsx` per table region, one `.jpg` crop per figure region, and
//! `res_<img_idx>.txt` with every region as a JSON line.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use tracing::{debug, warn};

use super::html_table::parse_table_html;
use super::xlsx::save_table_xlsx;
use super::RecoveryError;
use crate::vision::image_utils::{crop_to_bbox, encode_image};
use crate::vision::types::{LayoutRegion, RegionContent, RegionKind};

/// File stem shared by the exports of one region
pub fn region_file_stem(region: &LayoutRegion) -> String {
    let [x0, y0, x1, y1] = region.bbox;
    format!("{}_{}_{}_{}_{}", x0, y0, x1, y1, region.img_idx)
}

/// Save the structure result of `page`; returns the per-image folder
pub fn save_structure(
    page: &DynamicImage,
    regions: &[LayoutRegion],
    folder: &Path,
    img_name: &str,
) -> Result<PathBuf, RecoveryError> {
    let output_dir = folder.join(img_name);
    fs::create_dir_all(&output_dir)?;

    let img_idx = regions.first().map(|r| r.img_idx).unwrap_or(0);
    let mut res_file = fs::File::create(output_dir.join(format!("res_{}.txt", img_idx)))?;

    let mut tables = 0;
    for region in regions {
        match (region.kind(), &region.res) {
            (RegionKind::Table, RegionContent::Table(table)) => {
                let grid = parse_table_html(&table.html);
                if grid.is_empty() {
                    warn!("Table region {:?} has no cells, skipping export", region.bbox);
                } else {
                    let path = output_dir.join(format!("{}.xlsx", region_file_stem(region)));
                    save_table_xlsx(&grid, &path)?;
                    tables += 1;
                }
            }
            (RegionKind::Figure, _) => {
                if let Some(crop) = crop_to_bbox(page, region.bbox) {
                    let path = output_dir.join(format!("{}.jpg", region_file_stem(region)));
                    fs::write(path, encode_image(&crop, ImageFormat::Jpeg)?)?;
                }
            }
            _ => {}
        }

        serde_json::to_writer(&mut res_file, region)?;
        res_file.write_all(b"\n")?;
    }

    debug!(
        "Saved structure for {}: {} regions, {} tables",
        img_name,
        regions.len(),
        tables
    );
    Ok(output_dir)
}
