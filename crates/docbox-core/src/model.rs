//! The normalized extraction result model.
//!
//! Every backend produces one [`ExtractResult`]: a header (source type,
//! checksum, page count), the interned font and style tables, and an ordered
//! page list where each page owns its bounding boxes. Results are built once
//! and never mutated afterwards; a [`Cursor`](crate::cursor::Cursor) borrows
//! nothing and owns one result for its lifetime.

use serde::Serialize;
use std::fmt;

use crate::intern::{FontTable, StyleTable};

/// The source format a result was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Portable Document Format.
    Pdf,
    /// Spreadsheet workbook (OOXML).
    Xlsx,
    /// Word-processor document (OOXML).
    Docx,
    /// Plain byte stream split into lines.
    Text,
}

impl SourceType {
    /// The lowercase tag used in headers and JSON (`"pdf"`, `"xlsx"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Pdf => "pdf",
            SourceType::Xlsx => "xlsx",
            SourceType::Docx => "docx",
            SourceType::Text => "text",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One positioned, styled text fragment.
///
/// `x`/`y` are the top-left corner and `w`/`h` the size, in the unit system of
/// the owning page (points for PDF, columns/rows for XLSX and DOCX, characters
/// for text). `text` is trimmed of trailing ASCII space/tab and never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct BBox {
    /// Id of the containing page.
    pub page_id: u32,
    /// Id into the style table.
    pub style_id: u32,
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
    /// Fragment text, UTF-8, non-empty, no trailing ASCII space/tab.
    pub text: String,
    /// Raw spreadsheet formula prefixed with `=`; always `None` for sources
    /// other than XLSX.
    pub formula: Option<String>,
}

/// One backend-native logical page: a PDF page, a workbook sheet, a
/// word-processor table, or the single page of a plain-text stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Dense 0-based index equal to this page's position in
    /// [`ExtractResult::pages`].
    pub page_id: u32,
    /// Always 0; reserved for multi-document aggregation by embedding layers.
    pub document_id: u32,
    /// 1-based ordinal as reported by the backend.
    pub page_number: i32,
    /// Page width in backend-native units.
    pub width: f64,
    /// Page height in backend-native units.
    pub height: f64,
    /// Bounding boxes in emission order.
    pub bboxes: Vec<BBox>,
}

/// The normalized output of any backend.
#[derive(Debug, Clone)]
pub struct ExtractResult {
    /// The source format.
    pub source_type: SourceType,
    /// Lowercase hex MD5 of the exact source bytes, attached by the extractor.
    pub checksum: String,
    /// Total page/sheet/table count of the document. Negative values are an
    /// in-band failure sentinel; the extractor never hands such a result to a
    /// cursor.
    pub page_count: i32,
    /// Interned font names.
    pub fonts: FontTable,
    /// Interned styles.
    pub styles: StyleTable,
    /// Extracted pages in order.
    pub pages: Vec<Page>,
}

impl ExtractResult {
    /// Create an empty result shell for a backend to fill in.
    ///
    /// The checksum starts empty; the extractor attaches it after the backend
    /// returns.
    pub fn new(source_type: SourceType) -> Self {
        Self {
            source_type,
            checksum: String::new(),
            page_count: 0,
            fonts: FontTable::new(),
            styles: StyleTable::new(),
            pages: Vec::new(),
        }
    }
}
