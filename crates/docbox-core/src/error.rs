//! Error type shared by all open operations.
//!
//! Backend failures collapse to a small classification: either the source
//! cannot be opened at all, or a requested page range selects nothing. Once a
//! cursor exists, the `next_*` operations never fail; they yield items or
//! signal end-of-stream.

use thiserror::Error;

use crate::model::SourceType;

/// Why an open operation produced no cursor.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The selected backend could not parse the input.
    #[error("source is not a valid {format} document")]
    Malformed {
        /// The backend that rejected the input.
        format: SourceType,
    },

    /// The source buffer is empty or too small to classify.
    #[error("source buffer is empty")]
    EmptySource,

    /// The requested page range selects no pages after clamping.
    #[error("page range {start}..={end} selects no pages")]
    EmptyPageRange {
        /// Requested 1-based start page.
        start: i32,
        /// Requested 1-based end page.
        end: i32,
    },

    /// A container entry the format requires is missing.
    #[error("container entry {name:?} is missing")]
    MissingEntry {
        /// Entry path inside the container.
        name: String,
    },

    /// The backend for this format was not compiled into this build.
    #[error("{format} support is not enabled in this build")]
    BackendUnavailable {
        /// The format whose backend is unavailable.
        format: SourceType,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_names_the_format() {
        let err = ExtractError::Malformed {
            format: SourceType::Pdf,
        };
        assert_eq!(err.to_string(), "source is not a valid pdf document");
    }

    #[test]
    fn empty_page_range_reports_bounds() {
        let err = ExtractError::EmptyPageRange { start: 3, end: 2 };
        assert_eq!(err.to_string(), "page range 3..=2 selects no pages");
    }

    #[test]
    fn missing_entry_names_the_path() {
        let err = ExtractError::MissingEntry {
            name: "word/document.xml".to_string(),
        };
        assert!(err.to_string().contains("word/document.xml"));
    }

    #[test]
    fn implements_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ExtractError::EmptySource);
        assert_eq!(err.to_string(), "source buffer is empty");
    }
}
