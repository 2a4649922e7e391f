//! Cursor state machine, per-entity views, and the canonical JSON projection.
//!
//! A [`Cursor`] owns one [`ExtractResult`] and emits it as five independent,
//! once-through streams: the single-shot doc header, pages, fonts, styles, and
//! a flat scan over every page's bounding boxes. Each stream comes in two
//! flavors: a structured view struct and the canonical JSON string rendered
//! from that same view, so the two flavors always agree field-for-field.

use serde::{Serialize, Serializer};

use crate::intern::FontWeight;
use crate::model::{ExtractResult, SourceType};

/// Serialize a flag the way the wire format expects it: `0` or `1`.
fn bool_as_int<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

fn render<T: Serialize>(view: &T) -> String {
    serde_json::to_string(view).expect("view serialization is infallible")
}

/// The document header, returned once per cursor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocView {
    /// Source format tag.
    pub source_type: SourceType,
    /// Lowercase hex MD5 of the source bytes.
    pub checksum: String,
    /// Total page count of the document.
    pub page_count: i32,
}

/// One page of the result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    /// Dense page id.
    pub page_id: u32,
    /// Always 0 in the core.
    pub document_id: u32,
    /// 1-based page ordinal.
    pub page_number: i32,
    /// Page width in backend-native units.
    pub width: f64,
    /// Page height in backend-native units.
    pub height: f64,
}

/// One interned font.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontView {
    /// Dense font id.
    pub font_id: u32,
    /// Font name.
    pub name: String,
}

/// One interned style.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleView {
    /// Dense style id.
    pub style_id: u32,
    /// Id into the font table.
    pub font_id: u32,
    /// Font size.
    pub font_size: f64,
    /// Canonical `rgba(R,G,B,A)` color string.
    pub color: String,
    /// `"normal"` or `"bold"`.
    pub weight: FontWeight,
    /// Italic flag, serialized as `0`/`1`.
    #[serde(serialize_with = "bool_as_int")]
    pub italic: bool,
    /// Underline flag, serialized as `0`/`1`.
    #[serde(serialize_with = "bool_as_int")]
    pub underline: bool,
}

/// One bounding box from the flat scan.
///
/// `formula` is doubly optional: the outer level is whether the field exists
/// for this source type at all (present only for XLSX, where it serializes as
/// `null` when the cell had no formula), the inner level is the formula
/// itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BBoxView {
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
    /// Fragment text.
    pub text: String,
    /// Raw formula, present only for spreadsheet sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<Option<String>>,
}

/// Owns one extraction result and emits it as five independent streams.
///
/// The four iteration cursors (pages, fonts, styles, flat bboxes) advance
/// independently; the doc header is single-shot. A cursor is not restartable
/// and not safe for concurrent use.
#[derive(Debug)]
pub struct Cursor {
    result: ExtractResult,
    doc_returned: bool,
    page_index: usize,
    font_index: usize,
    style_index: usize,
    bbox_page: usize,
    bbox_within: usize,
}

impl Cursor {
    /// Wrap a finished extraction result.
    pub fn new(result: ExtractResult) -> Self {
        Self {
            result,
            doc_returned: false,
            page_index: 0,
            font_index: 0,
            style_index: 0,
            bbox_page: 0,
            bbox_within: 0,
        }
    }

    /// The underlying result, for embedders that need direct access.
    pub fn result(&self) -> &ExtractResult {
        &self.result
    }

    /// Return the document header, or `None` on every call after the first.
    pub fn doc(&mut self) -> Option<DocView> {
        if self.doc_returned {
            return None;
        }
        self.doc_returned = true;
        Some(DocView {
            source_type: self.result.source_type,
            checksum: self.result.checksum.clone(),
            page_count: self.result.page_count,
        })
    }

    /// JSON flavor of [`doc`](Cursor::doc); consumes the same single shot.
    pub fn doc_json(&mut self) -> Option<String> {
        self.doc().map(|view| render(&view))
    }

    /// Advance the page cursor, returning the next page or `None` at the end.
    pub fn next_page(&mut self) -> Option<PageView> {
        let page = self.result.pages.get(self.page_index)?;
        self.page_index += 1;
        Some(PageView {
            page_id: page.page_id,
            document_id: page.document_id,
            page_number: page.page_number,
            width: page.width,
            height: page.height,
        })
    }

    /// JSON flavor of [`next_page`](Cursor::next_page).
    pub fn next_page_json(&mut self) -> Option<String> {
        self.next_page().map(|view| render(&view))
    }

    /// Advance the font cursor, returning the next font or `None` at the end.
    pub fn next_font(&mut self) -> Option<FontView> {
        let entry = self.result.fonts.entries().get(self.font_index)?;
        self.font_index += 1;
        Some(FontView {
            font_id: entry.id,
            name: entry.name.clone(),
        })
    }

    /// JSON flavor of [`next_font`](Cursor::next_font).
    pub fn next_font_json(&mut self) -> Option<String> {
        self.next_font().map(|view| render(&view))
    }

    /// Advance the style cursor, returning the next style or `None` at the end.
    pub fn next_style(&mut self) -> Option<StyleView> {
        let entry = self.result.styles.entries().get(self.style_index)?;
        self.style_index += 1;
        Some(StyleView {
            style_id: entry.id,
            font_id: entry.font_id,
            font_size: entry.font_size,
            color: entry.color.clone(),
            weight: entry.weight,
            italic: entry.italic,
            underline: entry.underline,
        })
    }

    /// JSON flavor of [`next_style`](Cursor::next_style).
    pub fn next_style_json(&mut self) -> Option<String> {
        self.next_style().map(|view| render(&view))
    }

    /// Advance the flat bbox scan across all pages.
    ///
    /// Exhausts each page's boxes in order before moving to the next page;
    /// pages without boxes are skipped.
    pub fn next_bbox(&mut self) -> Option<BBoxView> {
        while self.bbox_page < self.result.pages.len() {
            let page = &self.result.pages[self.bbox_page];
            if let Some(bbox) = page.bboxes.get(self.bbox_within) {
                self.bbox_within += 1;
                let formula = match self.result.source_type {
                    SourceType::Xlsx => Some(bbox.formula.clone()),
                    _ => None,
                };
                return Some(BBoxView {
                    page_id: bbox.page_id,
                    style_id: bbox.style_id,
                    x: bbox.x,
                    y: bbox.y,
                    w: bbox.w,
                    h: bbox.h,
                    text: bbox.text.clone(),
                    formula,
                });
            }
            self.bbox_page += 1;
            self.bbox_within = 0;
        }
        None
    }

    /// JSON flavor of [`next_bbox`](Cursor::next_bbox).
    pub fn next_bbox_json(&mut self) -> Option<String> {
        self.next_bbox().map(|view| render(&view))
    }

    /// Drop the result and all internal state.
    pub fn close(self) {}
}
