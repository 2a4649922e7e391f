//! docbox: positioned, styled text extraction with a cursor data model.
//!
//! Extracts text fragments from heterogeneous document formats (PDF,
//! spreadsheet workbooks, word-processor documents, plain text) into one
//! uniform, tabular model: a document header, a page list, interned font and
//! style tables, and a flat stream of bounding boxes. A [`Cursor`] emits each
//! of those as an independent once-through stream, in a structured view or as
//! canonical JSON.
//!
//! # Architecture
//!
//! - **docbox-core**: data model, intern tables, run segmentation, format
//!   detection, cursor
//! - **docbox-parse**: the four format backends
//! - **docbox** (this crate): open operations, checksum attachment, process
//!   lifecycle hooks
//!
//! # Example
//!
//! ```
//! let mut cursor = docbox::open_text(b"alpha\nbeta\n").unwrap();
//! let doc = cursor.doc().unwrap();
//! assert_eq!(doc.page_count, 1);
//! while let Some(bbox) = cursor.next_bbox() {
//!     println!("{} @ ({}, {})", bbox.text, bbox.x, bbox.y);
//! }
//! cursor.close();
//! ```

#![deny(missing_docs)]

mod extractor;

pub use docbox_core::{
    detect, BBox, BBoxView, Cursor, DocView, ExtractError, ExtractResult, FontEntry, FontTable,
    FontView, FontWeight, Glyph, Page, PageView, Rgba, SourceType, StyleEntry, StyleTable,
    StyleView,
};
pub use docbox_parse::{DecodedPage, GlyphDecoder};
pub use extractor::{open_auto, open_docx, open_pdf, open_text, open_xlsx};

/// Prepare the PDF backend for use. Idempotent; must precede the first PDF
/// extraction in a process.
///
/// The pdfium-backed decoder binds and initializes the library when an open
/// operation needs it, so this hook has nothing left to acquire; it exists so
/// embedders have a symmetric lifecycle surface to call from their own
/// init paths.
pub fn pdf_init() {}

/// Release the PDF backend. Must follow the last PDF extraction.
///
/// The bound pdfium library stays resident for the life of the process —
/// tearing it down while another binding exists is not safe — so this hook
/// releases nothing.
pub fn pdf_destroy() {}

/// Prepare the spreadsheet backend. A no-op: the workbook reader needs no
/// process-wide state.
pub fn xlsx_init() {}

/// Release the spreadsheet backend. A no-op.
pub fn xlsx_destroy() {}
