// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Spreadsheet export of recognised tables

use std::path::Path;

use rust_xlsxwriter::{Format, FormatAlign, Workbook};
use tracing::warn;

use super::html_table::TableGrid;
use super::RecoveryError;

// Excel sheet limits
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

fn build_workbook(grid: &TableGrid) -> Result<Workbook, RecoveryError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let merged = Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);

    for cell in &grid.cells {
        if cell.last_row() >= MAX_ROWS || cell.last_col() >= MAX_COLS {
            continue;
        }
        let (row, col) = (cell.row as u32, cell.col as u16);
        if cell.is_merged() {
            let merge = worksheet
                .merge_range(
                    row,
                    col,
                    cell.last_row() as u32,
                    cell.last_col() as u16,
                    &cell.text,
                    &merged,
                )
                .map(|_| ());
            if let Err(e) = merge {
                // keep the text, lose the span
                warn!("Cell ({}, {}) written unmerged: {}", row, col, e);
                worksheet.write_string(row, col, &cell.text)?;
            }
        } else {
            worksheet.write_string(row, col, &cell.text)?;
        }
    }

    Ok(workbook)
}

/// Serialize a table as an `.xlsx` workbook
pub fn table_to_xlsx(grid: &TableGrid) -> Result<Vec<u8>, RecoveryError> {
    Ok(build_workbook(grid)?.save_to_buffer()?)
}

/// Write a table as an `.xlsx` file at `path`
pub fn save_table_xlsx(grid: &TableGrid, path: &Path) -> Result<(), RecoveryError> {
    std::fs::write(path, table_to_xlsx(grid)?)?;
    Ok(())
}
