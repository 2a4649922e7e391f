//! The glyph decoder capability consumed by the PDF backend.
//!
//! A decoder owns the low-level PDF machinery and reports, per page, the page
//! dimensions and a character stream with the telemetry the segmenter needs.
//! The PDF backend is generic over this trait, so the extraction pipeline and
//! its tests do not depend on a native PDF library.

use docbox_core::{ExtractError, Glyph};

/// One decoded page: dimensions in points plus its character telemetry in the
/// decoder's native character order. Glyph boxes use bottom-up page
/// coordinates.
#[derive(Debug, Clone, Default)]
pub struct DecodedPage {
    /// Page width in points.
    pub width: f64,
    /// Page height in points.
    pub height: f64,
    /// Characters in native order.
    pub glyphs: Vec<Glyph>,
}

/// Capability interface over a PDF glyph decoder.
pub trait GlyphDecoder {
    /// The decoder's parsed document type.
    type Document;

    /// Parse PDF bytes, optionally decrypting with an opaque password.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Malformed`] when the bytes are not a PDF the
    /// decoder can open (including a wrong password).
    fn open(&self, bytes: &[u8], password: Option<&str>) -> Result<Self::Document, ExtractError>;

    /// Total number of pages in the document.
    fn page_count(&self, document: &Self::Document) -> usize;

    /// Decode one page by 0-based index.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Malformed`] when the page cannot be loaded.
    fn decode_page(
        &self,
        document: &Self::Document,
        index: usize,
    ) -> Result<DecodedPage, ExtractError>;
}
