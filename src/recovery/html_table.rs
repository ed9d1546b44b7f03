// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Table HTML to cell grid
//!
//! The table engine renders each recognised table as HTML. Spreadsheet and
//! document exports both need the same thing from it: cells placed on a
//! row/column grid with their spans resolved.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// A cell placed on the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
    pub text: String,
}

impl GridCell {
    pub fn last_row(&self) -> usize {
        self.row + self.row_span - 1
    }

    pub fn last_col(&self) -> usize {
        self.col + self.col_span - 1
    }

    pub fn is_merged(&self) -> bool {
        self.row_span > 1 || self.col_span > 1
    }
}

/// Table cells with spans resolved to grid positions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableGrid {
    pub rows: usize,
    pub cols: usize,
    /// Cells in row-major document order
    pub cells: Vec<GridCell>,
}

impl TableGrid {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell whose top-left corner is at `(row, col)`
    pub fn cell_at(&self, row: usize, col: usize) -> Option<&GridCell> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }

    /// Cell covering `(row, col)`, including positions inside a span
    pub fn covering(&self, row: usize, col: usize) -> Option<&GridCell> {
        self.cells.iter().find(|c| {
            row >= c.row && row <= c.last_row() && col >= c.col && col <= c.last_col()
        })
    }
}

/// Widest `colspan` honoured, as in HTML
pub const MAX_COL_SPAN: usize = 1000;
/// Grid width limit, matching the widest spreadsheet
pub const MAX_GRID_COLS: usize = 16_384;

/// Parse the first table found in `html`
///
/// Spans are clipped so that no two cells overlap: a `rowspan` ends at the
/// last row of the table, and both spans stop short of any position an
/// earlier cell already covers.
pub fn parse_table_html(html: &str) -> TableGrid {
    let document = Html::parse_document(html);

    let (Ok(row_selector), Ok(cell_selector)) = (Selector::parse("tr"), Selector::parse("td, th"))
    else {
        return TableGrid::default();
    };

    let rows: Vec<ElementRef> = document.select(&row_selector).collect();
    let mut grid = TableGrid::default();
    let mut occupied: HashSet<(usize, usize)> = HashSet::new();

    for (row, tr) in rows.iter().enumerate() {
        let mut col = 0;
        for td in tr.select(&cell_selector) {
            while occupied.contains(&(row, col)) {
                col += 1;
            }
            if col >= MAX_GRID_COLS {
                debug!("Dropping cells past column {} in row {}", MAX_GRID_COLS, row);
                break;
            }

            let wide = span_attr(&td, "colspan")
                .min(MAX_COL_SPAN)
                .min(MAX_GRID_COLS - col);
            let tall = span_attr(&td, "rowspan").min(rows.len() - row);

            let col_span = (col..col + wide)
                .take_while(|c| !occupied.contains(&(row, *c)))
                .count();
            let row_span = (row..row + tall)
                .take_while(|r| (col..col + col_span).all(|c| !occupied.contains(&(*r, c))))
                .count();

            for r in row..row + row_span {
                for c in col..col + col_span {
                    occupied.insert((r, c));
                }
            }

            grid.cells.push(GridCell {
                row,
                col,
                row_span,
                col_span,
                text: cell_text(&td),
            });
            grid.rows = grid.rows.max(row + row_span);
            grid.cols = grid.cols.max(col + col_span);
            col += col_span;
        }
        grid.rows = grid.rows.max(row + 1);
    }

    grid
}

fn span_attr(element: &ElementRef, name: &str) -> usize {
    element
        .value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(1)
}

fn cell_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
