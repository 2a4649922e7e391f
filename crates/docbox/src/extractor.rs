//! Open operations: backend dispatch, checksum attachment, and sentinel
//! normalization.

use docbox_core::{detect, Cursor, ExtractError, ExtractResult, SourceType};

/// Attach the content checksum and normalize the backend result.
///
/// A backend that discovers a fatal problem mid-extraction may hand back a
/// result with a negative `page_count`; such a result never reaches a cursor.
fn finish(mut result: ExtractResult, bytes: &[u8]) -> Result<Cursor, ExtractError> {
    if result.page_count < 0 {
        return Err(ExtractError::Malformed {
            format: result.source_type,
        });
    }
    result.checksum = format!("{:x}", md5::compute(bytes));
    Ok(Cursor::new(result))
}

/// Open a PDF.
///
/// `start_page`/`end_page` are 1-based inclusive; `(0, 0)` means all pages.
/// The password is passed opaquely to the glyph decoder.
///
/// # Errors
///
/// Fails when the bytes are not a readable PDF, when the page range is empty
/// after clamping, or — without the `pdfium` feature — always, with
/// [`ExtractError::BackendUnavailable`].
#[cfg(feature = "pdfium")]
pub fn open_pdf(
    bytes: &[u8],
    password: Option<&str>,
    start_page: i32,
    end_page: i32,
) -> Result<Cursor, ExtractError> {
    let decoder = docbox_parse::PdfiumDecoder::bind()?;
    let result = docbox_parse::extract_pdf(&decoder, bytes, password, start_page, end_page)?;
    finish(result, bytes)
}

/// Open a PDF. This build carries no glyph decoder, so the open always fails
/// with [`ExtractError::BackendUnavailable`]; enable the `pdfium` feature for
/// PDF support.
#[cfg(not(feature = "pdfium"))]
pub fn open_pdf(
    _bytes: &[u8],
    _password: Option<&str>,
    _start_page: i32,
    _end_page: i32,
) -> Result<Cursor, ExtractError> {
    Err(ExtractError::BackendUnavailable {
        format: SourceType::Pdf,
    })
}

/// Open a spreadsheet workbook. Pages are sheets, 1-based inclusive;
/// `(0, 0)` means all sheets.
///
/// # Errors
///
/// Fails when the bytes are not a readable workbook or the sheet range is
/// empty after clamping.
pub fn open_xlsx(
    bytes: &[u8],
    password: Option<&str>,
    start_page: i32,
    end_page: i32,
) -> Result<Cursor, ExtractError> {
    let result = docbox_parse::extract_xlsx(bytes, password, start_page, end_page)?;
    finish(result, bytes)
}

/// Open a word-processor document; every top-level table becomes a page.
///
/// # Errors
///
/// Fails when the container or its `word/document.xml` cannot be read.
pub fn open_docx(bytes: &[u8]) -> Result<Cursor, ExtractError> {
    let result = docbox_parse::extract_docx(bytes)?;
    finish(result, bytes)
}

/// Open a plain byte stream as a single page of lines.
///
/// # Errors
///
/// Fails only for an empty buffer.
pub fn open_text(bytes: &[u8]) -> Result<Cursor, ExtractError> {
    let result = docbox_parse::extract_text(bytes)?;
    finish(result, bytes)
}

/// Detect the format and dispatch to the matching backend with default
/// options: no password, full page range.
///
/// # Errors
///
/// Fails when the buffer is empty or the selected backend rejects it.
pub fn open_auto(bytes: &[u8]) -> Result<Cursor, ExtractError> {
    if bytes.is_empty() {
        return Err(ExtractError::EmptySource);
    }
    match detect(bytes) {
        SourceType::Pdf => open_pdf(bytes, None, 0, 0),
        SourceType::Xlsx => open_xlsx(bytes, None, 0, 0),
        SourceType::Docx => open_docx(bytes),
        SourceType::Text => open_text(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_text_attaches_checksum() {
        let cursor = open_text(b"hello\n").unwrap();
        // MD5 of "hello\n".
        assert_eq!(
            cursor.result().checksum,
            "b1946ac92492d2347c6235b4d2611184"
        );
    }

    #[test]
    fn checksum_is_lowercase_hex() {
        let cursor = open_text(b"abc").unwrap();
        let checksum = &cursor.result().checksum;
        assert_eq!(checksum.len(), 32);
        assert!(checksum
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn negative_page_count_sentinel_fails_open() {
        let mut result = docbox_core::ExtractResult::new(SourceType::Text);
        result.page_count = -1;
        let err = finish(result, b"x").unwrap_err();
        assert!(matches!(
            err,
            ExtractError::Malformed {
                format: SourceType::Text
            }
        ));
    }

    #[test]
    fn open_auto_on_empty_buffer_fails() {
        assert!(matches!(
            open_auto(b"").unwrap_err(),
            ExtractError::EmptySource
        ));
    }

    #[test]
    fn open_auto_routes_plain_bytes_to_text() {
        let mut cursor = open_auto(b"plain line\n").unwrap();
        let doc = cursor.doc().unwrap();
        assert_eq!(doc.source_type, SourceType::Text);
    }

    #[cfg(not(feature = "pdfium"))]
    #[test]
    fn pdf_without_decoder_is_unavailable() {
        let err = open_pdf(b"%PDF-1.4\n", None, 0, 0).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::BackendUnavailable {
                format: SourceType::Pdf
            }
        ));
    }

    #[test]
    fn truncated_pdf_fails_open() {
        // With a decoder the bytes are unreadable; without one the backend is
        // unavailable. Either way no cursor is produced.
        assert!(open_pdf(b"%PDF", None, 0, 0).is_err());
    }
}
