// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Structured results returned by the recognition engines

use serde::{Deserialize, Serialize};

/// Four corner points of a detected text line, clockwise from top-left
pub type Quad = [[f32; 2]; 4];

/// A recognised line of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// Corner points in page coordinates
    pub coordinate: Quad,
    /// Recognised text
    pub text: String,
    /// Recognition confidence (0.0-1.0)
    pub score: f32,
}

impl TextLine {
    pub fn new(text: impl Into<String>, score: f32, coordinate: Quad) -> Self {
        Self {
            coordinate,
            text: text.into(),
            score,
        }
    }
}

/// Join recognised strings in engine order with single spaces
pub fn join_text(lines: &[TextLine]) -> String {
    lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Output of table-structure recognition for a single table region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableContent {
    /// Table rendered as `<table>` HTML
    pub html: String,
    /// Cell boxes, when the engine reports them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cell_bbox: Vec<Vec<f32>>,
}

/// Content of a layout region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegionContent {
    Table(TableContent),
    Lines(Vec<TextLine>),
}

impl RegionContent {
    pub fn is_empty(&self) -> bool {
        match self {
            RegionContent::Table(table) => table.html.trim().is_empty(),
            RegionContent::Lines(lines) => lines.is_empty(),
        }
    }

    pub fn lines(&self) -> &[TextLine] {
        match self {
            RegionContent::Lines(lines) => lines,
            RegionContent::Table(_) => &[],
        }
    }
}

/// Reading-order column assignment computed during document recovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnLayout {
    Single,
    Double,
}

/// A region found by layout analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRegion {
    /// Region type label (text, title, figure, table, list, ...)
    #[serde(rename = "type")]
    pub region_type: String,
    /// `[x0, y0, x1, y1]` in page pixels
    pub bbox: [i32; 4],
    /// Page index within the submitted image
    #[serde(default)]
    pub img_idx: usize,
    pub res: RegionContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<ColumnLayout>,
}

impl LayoutRegion {
    pub fn kind(&self) -> RegionKind {
        RegionKind::from_label(&self.region_type)
    }
}

/// Region labels that drive document recovery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Figure,
    Title,
    Table,
    Text,
}

impl RegionKind {
    pub fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "figure" => RegionKind::Figure,
            "title" => RegionKind::Title,
            "table" => RegionKind::Table,
            _ => RegionKind::Text,
        }
    }
}
