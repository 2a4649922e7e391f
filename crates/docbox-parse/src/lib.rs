//! Format backends for docbox.
//!
//! Each backend maps one source format into a normalized
//! [`ExtractResult`](docbox_core::ExtractResult):
//!
//! - [`pdf`] — per-character glyph telemetry, segmented into styled runs.
//!   Generic over a [`GlyphDecoder`]; a pdfium-backed decoder is available
//!   behind the `pdfium` feature.
//! - [`xlsx`] — workbook sheets as pages, cells as boxes, merged ranges
//!   honored.
//! - [`docx`] — top-level document tables as pages, cells as boxes, gridSpan
//!   and vMerge honored.
//! - [`text`] — one page, one box per non-empty line.
//!
//! Backends never attach checksums; the extractor in the facade crate does.

#![deny(missing_docs)]

/// In-memory ZIP container access shared by the OOXML backends.
pub mod container;
/// The glyph decoder capability consumed by the PDF backend.
pub mod decoder;
/// Word-processor table layout.
pub mod docx;
/// PDF extraction over a glyph decoder.
pub mod pdf;
/// Glyph decoding through a system pdfium library.
#[cfg(feature = "pdfium")]
pub mod pdfium;
/// Plain-text line layout.
pub mod text;
/// Namespace-insensitive XML event helpers.
pub mod xml;
/// Spreadsheet cell layout.
pub mod xlsx;

pub use decoder::{DecodedPage, GlyphDecoder};
pub use docx::extract_docx;
pub use pdf::extract_pdf;
#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumDecoder;
pub use text::extract_text;
pub use xlsx::extract_xlsx;
