// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Engine output to `.docx`

use image::{DynamicImage, ImageFormat};
use tracing::debug;

use super::docx::{DocxBuilder, Paragraph, Run};
use super::html_table::parse_table_html;
use super::RecoveryError;
use crate::vision::image_utils::{crop_to_bbox, encode_image};
use crate::vision::types::{join_text, ColumnLayout, LayoutRegion, RegionContent, RegionKind, TextLine};

const FIGURE_WIDTH_SINGLE_IN: f32 = 5.0;
const FIGURE_WIDTH_DOUBLE_IN: f32 = 2.0;
const TEXT_FIRST_LINE_INDENT_IN: f32 = 0.25;
const TEXT_SIZE_PT: f32 = 10.0;

/// One paragraph holding the recognised strings joined by spaces
pub fn text_to_docx(lines: &[TextLine]) -> Result<Vec<u8>, RecoveryError> {
    let mut doc = DocxBuilder::new();
    doc.add_paragraph(join_text(lines));
    doc.to_bytes()
}

/// Rebuild a page as a document from regions already in reading order
pub fn layout_to_docx(page: &DynamicImage, regions: &[LayoutRegion]) -> Result<Vec<u8>, RecoveryError> {
    let mut doc = DocxBuilder::new();

    for region in regions {
        let kind = region.kind();
        if region.res.is_empty() {
            continue;
        }

        let columns = match region.layout.unwrap_or(ColumnLayout::Single) {
            ColumnLayout::Single => 1,
            ColumnLayout::Double => 2,
        };
        if columns != doc.columns() {
            doc.start_section(columns);
        }

        match kind {
            RegionKind::Figure => {
                let Some(crop) = crop_to_bbox(page, region.bbox) else {
                    debug!("Skipping empty figure region {:?}", region.bbox);
                    continue;
                };
                let width = if columns == 1 {
                    FIGURE_WIDTH_SINGLE_IN
                } else {
                    FIGURE_WIDTH_DOUBLE_IN
                };
                let png = encode_image(&crop, ImageFormat::Png)?;
                doc.add_picture(png, crop.width(), crop.height(), width);
            }
            RegionKind::Title => {
                if let Some(first) = region.res.lines().first() {
                    doc.add_heading(first.text.clone(), 1);
                }
            }
            RegionKind::Table => {
                if let RegionContent::Table(table) = &region.res {
                    doc.add_table(parse_table_html(&table.html));
                }
            }
            RegionKind::Text => {
                let runs = region
                    .res
                    .lines()
                    .iter()
                    .map(|line| Run::sized(format!("{} ", line.text), TEXT_SIZE_PT))
                    .collect();
                doc.add_formatted_paragraph(Paragraph {
                    runs,
                    first_line_indent_in: Some(TEXT_FIRST_LINE_INDENT_IN),
                    centered: false,
                });
            }
        }
    }

    doc.to_bytes()
}
