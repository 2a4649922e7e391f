//! Plain-text line layout.
//!
//! One page; one box per line whose text survives trailing-whitespace
//! trimming. Line numbers are 1-based and count empty lines, so the page
//! height reflects the full line count even when blank lines emit nothing.

use docbox_core::{BBox, ExtractError, ExtractResult, FontWeight, Page, SourceType};

const TEXT_FONT: &str = "monospace";
const TEXT_FONT_SIZE: f64 = 12.0;
const TEXT_COLOR: &str = "rgba(0,0,0,255)";

/// Extract a plain byte stream.
///
/// The stream is split at `\n`; a `\r` before the terminator is treated as
/// part of it. A trailing newline closes the last line rather than opening an
/// empty one. Non-UTF-8 bytes are replaced lossily.
pub fn extract_text(bytes: &[u8]) -> Result<ExtractResult, ExtractError> {
    if bytes.is_empty() {
        return Err(ExtractError::EmptySource);
    }

    let mut result = ExtractResult::new(SourceType::Text);
    let font_id = result.fonts.intern(TEXT_FONT);
    let style_id = result.styles.intern(
        font_id,
        TEXT_FONT_SIZE,
        TEXT_COLOR,
        FontWeight::Normal,
        false,
        false,
    );

    let mut page = Page {
        page_id: 0,
        document_id: 0,
        page_number: 1,
        width: 0.0,
        height: 0.0,
        bboxes: Vec::new(),
    };

    let mut line_number = 0u32;
    for line in bytes.split(|&b| b == b'\n') {
        line_number += 1;
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            continue;
        }

        let mut text = String::from_utf8_lossy(line).into_owned();
        while text.ends_with(' ') || text.ends_with('\t') {
            text.pop();
        }
        if text.is_empty() {
            continue;
        }

        let width = line.len() as f64;
        if width > page.width {
            page.width = width;
        }
        page.bboxes.push(BBox {
            page_id: 0,
            style_id,
            x: 1.0,
            y: f64::from(line_number),
            w: width,
            h: 1.0,
            text,
            formula: None,
        });
    }

    // A trailing newline terminates the final line instead of starting a new
    // empty one.
    if bytes.ends_with(b"\n") {
        line_number -= 1;
    }

    page.height = f64::from(line_number);
    result.page_count = 1;
    result.pages.push(page);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_fails() {
        assert!(matches!(
            extract_text(b"").unwrap_err(),
            ExtractError::EmptySource
        ));
    }

    #[test]
    fn single_page_with_default_style() {
        let result = extract_text(b"hello\n").unwrap();
        assert_eq!(result.source_type, SourceType::Text);
        assert_eq!(result.page_count, 1);
        assert_eq!(result.pages.len(), 1);
        assert_eq!(result.fonts.entries()[0].name, "monospace");
        let style = &result.styles.entries()[0];
        assert_eq!(style.font_size, 12.0);
        assert_eq!(style.color, "rgba(0,0,0,255)");
    }

    #[test]
    fn blank_lines_count_for_height_but_emit_nothing() {
        // The layout scenario: "a\n\nbb\n" has height 3 and two boxes.
        let result = extract_text(b"a\n\nbb\n").unwrap();
        let page = &result.pages[0];
        assert_eq!(page.height, 3.0);
        assert_eq!(page.width, 2.0);
        assert_eq!(page.bboxes.len(), 2);

        let a = &page.bboxes[0];
        assert_eq!((a.x, a.y, a.w, a.h), (1.0, 1.0, 1.0, 1.0));
        assert_eq!(a.text, "a");

        let bb = &page.bboxes[1];
        assert_eq!((bb.x, bb.y, bb.w, bb.h), (1.0, 3.0, 2.0, 1.0));
        assert_eq!(bb.text, "bb");
    }

    #[test]
    fn missing_trailing_newline_still_emits_final_line() {
        let result = extract_text(b"one\ntwo").unwrap();
        let page = &result.pages[0];
        assert_eq!(page.height, 2.0);
        assert_eq!(page.bboxes.len(), 2);
        assert_eq!(page.bboxes[1].text, "two");
        assert_eq!(page.bboxes[1].y, 2.0);
    }

    #[test]
    fn crlf_terminators_are_stripped() {
        let result = extract_text(b"ab\r\ncd\r\n").unwrap();
        let page = &result.pages[0];
        assert_eq!(page.height, 2.0);
        assert_eq!(page.bboxes[0].text, "ab");
        assert_eq!(page.bboxes[0].w, 2.0);
    }

    #[test]
    fn trailing_spaces_trimmed_but_width_kept() {
        let result = extract_text(b"ab  \n").unwrap();
        let bbox = &result.pages[0].bboxes[0];
        assert_eq!(bbox.text, "ab");
        assert_eq!(bbox.w, 4.0);
        assert_eq!(result.pages[0].width, 4.0);
    }

    #[test]
    fn whitespace_only_line_emits_nothing() {
        let result = extract_text(b"a\n   \nb\n").unwrap();
        let page = &result.pages[0];
        assert_eq!(page.bboxes.len(), 2);
        assert_eq!(page.height, 3.0);
        assert_eq!(page.bboxes[1].y, 3.0);
    }

    #[test]
    fn newline_only_input_has_empty_page() {
        let result = extract_text(b"\n").unwrap();
        let page = &result.pages[0];
        assert!(page.bboxes.is_empty());
        assert_eq!(page.height, 1.0);
        assert_eq!(page.width, 0.0);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let result = extract_text(b"a\xFFb\n").unwrap();
        let bbox = &result.pages[0].bboxes[0];
        assert_eq!(bbox.text, "a\u{FFFD}b");
        // Width counts source bytes, not replacement characters.
        assert_eq!(bbox.w, 3.0);
    }
}
