// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Minimal WordprocessingML writer
//!
//! Produces `.docx` files with paragraphs, headings, bordered tables,
//! centred pictures and continuous section breaks that switch the column
//! count. A `.docx` is a zip container; only the parts Word requires are
//! written.

use std::collections::HashMap;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::html_table::TableGrid;
use super::RecoveryError;

/// MIME type for generated documents
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// EMUs per inch (DrawingML unit)
const EMU_PER_INCH: f64 = 914_400.0;
/// Twentieths of a point per inch
const TWIPS_PER_INCH: f64 = 1_440.0;

const NS_DECLS: &str = concat!(
    r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture""#
);

const CONTENT_TYPES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Default Extension="png" ContentType="image/png"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
    r#"</Types>"#
);

const PACKAGE_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#
);

const STYLES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
    r#"<w:docDefaults><w:rPrDefault><w:rPr>"#,
    r#"<w:rFonts w:ascii="Times New Roman" w:hAnsi="Times New Roman" w:eastAsia="SimSun" w:cs="Times New Roman"/>"#,
    r#"<w:sz w:val="22"/></w:rPr></w:rPrDefault></w:docDefaults>"#,
    r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>"#,
    r#"<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/>"#,
    r#"<w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="0"/></w:pPr>"#,
    r#"<w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style>"#,
    r#"<w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/><w:tblPr><w:tblBorders>"#,
    r#"<w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
    r#"<w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
    r#"<w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
    r#"</w:tblBorders></w:tblPr></w:style>"#,
    r#"</w:styles>"#
);

/// A run of text inside a paragraph
#[derive(Debug, Clone)]
pub struct Run {
    pub text: String,
    /// Font size in points
    pub size_pt: Option<f32>,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size_pt: None,
        }
    }

    pub fn sized(text: impl Into<String>, size_pt: f32) -> Self {
        Self {
            text: text.into(),
            size_pt: Some(size_pt),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub first_line_indent_in: Option<f32>,
    pub centered: bool,
}

#[derive(Debug, Clone)]
enum Block {
    Paragraph(Paragraph),
    Heading { text: String, level: u8 },
    Table(TableGrid),
    Picture { media: usize, cx: u64, cy: u64 },
    /// Ends the current section; carries that section's column count
    SectionBreak { columns: u8 },
}

/// Builds a `.docx` document in memory
#[derive(Debug, Clone)]
pub struct DocxBuilder {
    blocks: Vec<Block>,
    media: Vec<Vec<u8>>,
    columns: u8,
}

impl Default for DocxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            media: Vec::new(),
            columns: 1,
        }
    }

    /// Column count of the section being written
    pub fn columns(&self) -> u8 {
        self.columns
    }

    pub fn add_paragraph(&mut self, text: impl Into<String>) -> &mut Self {
        self.blocks.push(Block::Paragraph(Paragraph {
            runs: vec![Run::new(text)],
            ..Default::default()
        }));
        self
    }

    pub fn add_formatted_paragraph(&mut self, paragraph: Paragraph) -> &mut Self {
        self.blocks.push(Block::Paragraph(paragraph));
        self
    }

    pub fn add_heading(&mut self, text: impl Into<String>, level: u8) -> &mut Self {
        self.blocks.push(Block::Heading {
            text: text.into(),
            level: level.clamp(1, 9),
        });
        self
    }

    pub fn add_table(&mut self, grid: TableGrid) -> &mut Self {
        if !grid.is_empty() {
            self.blocks.push(Block::Table(grid));
        }
        self
    }

    /// Add a centred PNG picture scaled to `width_in` inches
    pub fn add_picture(
        &mut self,
        png: Vec<u8>,
        pixel_width: u32,
        pixel_height: u32,
        width_in: f32,
    ) -> &mut Self {
        if pixel_width == 0 || pixel_height == 0 {
            return self;
        }
        let cx = (width_in as f64 * EMU_PER_INCH).round();
        let cy = cx * pixel_height as f64 / pixel_width as f64;
        self.media.push(png);
        self.blocks.push(Block::Picture {
            media: self.media.len(),
            cx: cx as u64,
            cy: cy.round() as u64,
        });
        self
    }

    /// Start a continuous section with `columns` text columns
    pub fn start_section(&mut self, columns: u8) -> &mut Self {
        let columns = columns.max(1);
        self.blocks.push(Block::SectionBreak {
            columns: self.columns,
        });
        self.columns = columns;
        self
    }

    /// `word/document.xml`
    pub fn document_xml(&self) -> String {
        let mut body = String::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph(paragraph) => write_paragraph(&mut body, paragraph),
                Block::Heading { text, level } => {
                    body.push_str(&format!(
                        r#"<w:p><w:pPr><w:pStyle w:val="Heading{}"/></w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                        level,
                        escape_xml(text)
                    ));
                }
                Block::Table(grid) => write_table(&mut body, grid),
                Block::Picture { media, cx, cy } => write_picture(&mut body, *media, *cx, *cy),
                Block::SectionBreak { columns } => {
                    body.push_str("<w:p><w:pPr>");
                    body.push_str(&section_properties(*columns));
                    body.push_str("</w:pPr></w:p>");
                }
            }
        }
        body.push_str(&section_properties(self.columns));

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {}><w:body>{}</w:body></w:document>"#,
            NS_DECLS, body
        )
    }

    fn document_rels_xml(&self) -> String {
        let mut rels = String::from(concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rIdStyles" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#
        ));
        for index in 1..=self.media.len() {
            rels.push_str(&format!(
                r#"<Relationship Id="rIdImage{0}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image{0}.png"/>"#,
                index
            ));
        }
        rels.push_str("</Relationships>");
        rels
    }

    /// Serialize the package
    pub fn to_bytes(&self) -> Result<Vec<u8>, RecoveryError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(PACKAGE_RELS_XML.as_bytes())?;

        zip.start_file("word/document.xml", options)?;
        zip.write_all(self.document_xml().as_bytes())?;

        zip.start_file("word/styles.xml", options)?;
        zip.write_all(STYLES_XML.as_bytes())?;

        zip.start_file("word/_rels/document.xml.rels", options)?;
        zip.write_all(self.document_rels_xml().as_bytes())?;

        // PNG is already compressed
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (i, png) in self.media.iter().enumerate() {
            zip.start_file(format!("word/media/image{}.png", i + 1), stored)?;
            zip.write_all(png)?;
        }

        Ok(zip.finish()?.into_inner())
    }
}

fn write_paragraph(out: &mut String, paragraph: &Paragraph) {
    out.push_str("<w:p>");
    if paragraph.first_line_indent_in.is_some() || paragraph.centered {
        out.push_str("<w:pPr>");
        if let Some(indent) = paragraph.first_line_indent_in {
            out.push_str(&format!(
                r#"<w:ind w:firstLine="{}"/>"#,
                (indent as f64 * TWIPS_PER_INCH).round() as u32
            ));
        }
        if paragraph.centered {
            out.push_str(r#"<w:jc w:val="center"/>"#);
        }
        out.push_str("</w:pPr>");
    }
    for run in &paragraph.runs {
        out.push_str("<w:r>");
        if let Some(size) = run.size_pt {
            // w:sz is in half-points
            out.push_str(&format!(
                r#"<w:rPr><w:sz w:val="{}"/></w:rPr>"#,
                (size * 2.0).round() as u32
            ));
        }
        out.push_str(&format!(
            r#"<w:t xml:space="preserve">{}</w:t></w:r>"#,
            escape_xml(&run.text)
        ));
    }
    out.push_str("</w:p>");
}

fn write_table(out: &mut String, grid: &TableGrid) {
    const BORDER: &str = r#"w:val="single" w:sz="4" w:space="0" w:color="auto""#;
    // 6" of usable width spread over the grid
    let col_width = (6.0 * TWIPS_PER_INCH / grid.cols.max(1) as f64).round() as u32;

    out.push_str(r#"<w:tbl><w:tblPr><w:tblStyle w:val="TableGrid"/><w:tblW w:w="0" w:type="auto"/><w:tblBorders>"#);
    for side in ["top", "left", "bottom", "right", "insideH", "insideV"] {
        out.push_str(&format!("<w:{} {}/>", side, BORDER));
    }
    out.push_str("</w:tblBorders></w:tblPr><w:tblGrid>");
    for _ in 0..grid.cols {
        out.push_str(&format!(r#"<w:gridCol w:w="{}"/>"#, col_width));
    }
    out.push_str("</w:tblGrid>");

    let mut anchors = HashMap::new();
    let mut continued = HashMap::new();
    for cell in &grid.cells {
        anchors.insert((cell.row, cell.col), cell);
        for row in cell.row + 1..=cell.last_row() {
            continued.insert((row, cell.col), cell);
        }
    }

    for row in 0..grid.rows {
        out.push_str("<w:tr>");
        let mut col = 0;
        while col < grid.cols {
            if let Some(cell) = anchors.get(&(row, col)) {
                out.push_str("<w:tc>");
                write_cell_properties(out, cell.col_span, (cell.row_span > 1).then_some(true));
                out.push_str(&format!(
                    r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p></w:tc>"#,
                    escape_xml(&cell.text)
                ));
                col += cell.col_span;
            } else if let Some(cell) = continued.get(&(row, col)) {
                // continuation of a cell spanning down from an earlier row
                out.push_str("<w:tc>");
                write_cell_properties(out, cell.col_span, Some(false));
                out.push_str("<w:p/></w:tc>");
                col += cell.col_span;
            } else {
                out.push_str("<w:tc><w:p/></w:tc>");
                col += 1;
            }
        }
        out.push_str("</w:tr>");
    }
    out.push_str("</w:tbl>");
}

/// `v_merge`: `Some(true)` starts a vertical merge, `Some(false)` continues one
fn write_cell_properties(out: &mut String, col_span: usize, v_merge: Option<bool>) {
    if col_span <= 1 && v_merge.is_none() {
        return;
    }
    out.push_str("<w:tcPr>");
    if col_span > 1 {
        out.push_str(&format!(r#"<w:gridSpan w:val="{}"/>"#, col_span));
    }
    match v_merge {
        Some(true) => out.push_str(r#"<w:vMerge w:val="restart"/>"#),
        Some(false) => out.push_str("<w:vMerge/>"),
        None => {}
    }
    out.push_str("</w:tcPr>");
}

fn write_picture(out: &mut String, media: usize, cx: u64, cy: u64) {
    out.push_str(&format!(
        concat!(
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:drawing>"#,
            r#"<wp:inline distT="0" distB="0" distL="0" distR="0">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
            r#"<wp:docPr id="{id}" name="Picture {id}"/>"#,
            r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
            r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:pic><pic:nvPicPr><pic:cNvPr id="{id}" name="image{id}.png"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip r:embed="rIdImage{id}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic>"#,
            r#"</a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#
        ),
        cx = cx,
        cy = cy,
        id = media
    ));
}

fn section_properties(columns: u8) -> String {
    format!(
        concat!(
            r#"<w:sectPr><w:type w:val="continuous"/><w:pgSz w:w="12240" w:h="15840"/>"#,
            r#"<w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/>"#,
            r#"<w:cols w:num="{}" w:space="720"/></w:sectPr>"#
        ),
        columns
    )
}

/// Escape text for XML content, dropping characters XML 1.0 forbids
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(ch),
            c if (c as u32) < 0x20 => {}
            '\u{FFFE}' | '\u{FFFF}' => {}
            c => escaped.push(c),
        }
    }
    escaped
}
