//! Backend-independent data model and algorithms for docbox.
//!
//! This crate provides the normalized extraction result ([`ExtractResult`],
//! [`Page`], [`BBox`]), the font and style intern tables, the PDF run
//! segmentation algorithm, format auto-detection, and the cursor that emits a
//! result as five independent streams with structured and JSON views.
//!
//! # Modules
//!
//! - [`model`] — Result model: [`SourceType`], [`BBox`], [`Page`], [`ExtractResult`]
//! - [`intern`] — Intern tables: [`FontTable`], [`StyleTable`], [`FontWeight`]
//! - [`color`] — RGBA colors: [`Rgba`], ARGB hex decoding
//! - [`glyph`] — Per-character PDF telemetry: [`Glyph`]
//! - [`segment`] — Run segmentation: [`segment_page`]
//! - [`detect`] — Format auto-detection: [`detect`]
//! - [`cursor`] — Cursor state machine and views: [`Cursor`]
//! - [`error`] — Error type: [`ExtractError`]

#![deny(missing_docs)]

/// RGBA color values and the canonical `rgba(R,G,B,A)` string form.
pub mod color;
/// Cursor state machine, per-entity views, and the canonical JSON projection.
pub mod cursor;
/// Format auto-detection from leading bytes.
pub mod detect;
/// Error type shared by all open operations.
pub mod error;
/// Per-character telemetry produced by a PDF glyph decoder.
pub mod glyph;
/// Insertion-ordered intern tables for fonts and styles.
pub mod intern;
/// The normalized extraction result model.
pub mod model;
/// Segmentation of character telemetry into styled line-runs.
pub mod segment;

pub use color::Rgba;
pub use cursor::{BBoxView, Cursor, DocView, FontView, PageView, StyleView};
pub use detect::detect;
pub use error::ExtractError;
pub use glyph::{Glyph, FONT_FLAG_FORCE_BOLD, FONT_FLAG_ITALIC};
pub use intern::{FontEntry, FontTable, FontWeight, StyleEntry, StyleTable};
pub use model::{BBox, ExtractResult, Page, SourceType};
pub use segment::segment_page;
