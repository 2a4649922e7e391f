//! PDF extraction over a glyph decoder.
//!
//! The decoder supplies per-character telemetry; this backend resolves the
//! page range, runs the segmenter over each selected page, and assembles the
//! normalized result. Pages are processed in ascending index and boxes emitted
//! in character-scan order.

use tracing::debug;

use docbox_core::{segment_page, ExtractError, ExtractResult, Page, SourceType};

use crate::decoder::GlyphDecoder;

/// Extract a PDF through the given glyph decoder.
///
/// `start_page`/`end_page` are 1-based inclusive; `(0, 0)` selects every page.
/// The upper bound clamps to the real page count; a range that is empty after
/// clamping fails with [`ExtractError::EmptyPageRange`]. `page_count` in the
/// result reports the document total, not the number of extracted pages.
pub fn extract_pdf<D: GlyphDecoder>(
    decoder: &D,
    bytes: &[u8],
    password: Option<&str>,
    start_page: i32,
    end_page: i32,
) -> Result<ExtractResult, ExtractError> {
    if bytes.is_empty() {
        return Err(ExtractError::EmptySource);
    }

    let document = decoder.open(bytes, password)?;
    let total = decoder.page_count(&document) as i32;

    let start = if start_page > 0 { start_page } else { 1 };
    let end = if end_page > 0 { end_page.min(total) } else { total };
    if start > end {
        return Err(ExtractError::EmptyPageRange {
            start: start_page,
            end: end_page,
        });
    }

    let mut result = ExtractResult::new(SourceType::Pdf);
    result.page_count = total;

    for index in (start as usize - 1)..(end as usize) {
        let decoded = decoder.decode_page(&document, index)?;
        let page_id = result.pages.len() as u32;
        let bboxes = segment_page(
            decoded.height,
            &decoded.glyphs,
            &mut result.fonts,
            &mut result.styles,
            page_id,
        );
        debug!(
            page = index + 1,
            glyphs = decoded.glyphs.len(),
            runs = bboxes.len(),
            "pdf page segmented"
        );
        result.pages.push(Page {
            page_id,
            document_id: 0,
            page_number: index as i32 + 1,
            width: decoded.width,
            height: decoded.height,
            bboxes,
        });
    }

    Ok(result)
}
