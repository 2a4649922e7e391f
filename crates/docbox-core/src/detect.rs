//! Format auto-detection from leading bytes.

use crate::model::SourceType;

/// How much of a ZIP buffer is scanned for OOXML entry-name prefixes.
const ZIP_SCAN_WINDOW: usize = 4096;

const PDF_MAGIC: &[u8] = b"%PDF";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Classify a byte buffer as one of the four supported formats.
///
/// Rules, in order:
///
/// 1. `%PDF` magic → [`SourceType::Pdf`].
/// 2. ZIP local-file magic → scan the first 4 KiB for the ASCII prefixes
///    `xl/` or `word/`; the first one encountered decides between
///    [`SourceType::Xlsx`] and [`SourceType::Docx`]. A ZIP with neither is
///    reported as XLSX.
/// 3. Anything else → [`SourceType::Text`].
///
/// Detection never fails; whether the buffer actually opens is decided by the
/// selected backend.
pub fn detect(bytes: &[u8]) -> SourceType {
    if bytes.starts_with(PDF_MAGIC) {
        return SourceType::Pdf;
    }
    if bytes.starts_with(ZIP_MAGIC) {
        let window = &bytes[..bytes.len().min(ZIP_SCAN_WINDOW)];
        for i in 0..window.len() {
            let rest = &window[i..];
            if rest.starts_with(b"xl/") {
                return SourceType::Xlsx;
            }
            // Five-byte match, so names merely starting with `w` don't hit.
            if rest.starts_with(b"word/") {
                return SourceType::Docx;
            }
        }
        return SourceType::Xlsx;
    }
    SourceType::Text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_magic() {
        assert_eq!(detect(b"%PDF-1.4\nrest of file"), SourceType::Pdf);
    }

    #[test]
    fn pdf_magic_alone_is_enough() {
        assert_eq!(detect(b"%PDF"), SourceType::Pdf);
    }

    #[test]
    fn zip_with_xl_prefix_is_xlsx() {
        assert_eq!(
            detect(b"PK\x03\x04.....xl/workbook.xml....."),
            SourceType::Xlsx
        );
    }

    #[test]
    fn zip_with_word_prefix_is_docx() {
        assert_eq!(
            detect(b"PK\x03\x04.....word/document.xml....."),
            SourceType::Docx
        );
    }

    #[test]
    fn first_prefix_encountered_wins() {
        assert_eq!(
            detect(b"PK\x03\x04..word/document.xml..xl/workbook.xml"),
            SourceType::Docx
        );
        assert_eq!(
            detect(b"PK\x03\x04..xl/workbook.xml..word/document.xml"),
            SourceType::Xlsx
        );
    }

    #[test]
    fn zip_without_known_prefix_defaults_to_xlsx() {
        assert_eq!(detect(b"PK\x03\x04..docProps/app.xml.."), SourceType::Xlsx);
    }

    #[test]
    fn word_needs_the_full_five_bytes() {
        // `wor` and `w/` must not be mistaken for `word/`.
        assert_eq!(detect(b"PK\x03\x04..work/notes.txt.."), SourceType::Xlsx);
    }

    #[test]
    fn prefix_outside_the_window_is_not_seen() {
        let mut bytes = Vec::from(&b"PK\x03\x04"[..]);
        bytes.resize(5000, b'.');
        bytes.extend_from_slice(b"word/document.xml");
        assert_eq!(detect(&bytes), SourceType::Xlsx);
    }

    #[test]
    fn plain_bytes_are_text() {
        assert_eq!(detect(b"hello\n"), SourceType::Text);
        assert_eq!(detect(b""), SourceType::Text);
        assert_eq!(detect(b"PK\x05\x06"), SourceType::Text);
    }
}
