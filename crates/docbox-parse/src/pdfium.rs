//! Glyph decoding through a system pdfium library.
//!
//! Binds pdfium at runtime and drives its text API per character:
//! codepoint (with UTF-16 surrogate pairs combined), glyph box, font
//! name/flags/size, and fill color — exactly the telemetry
//! [`segment_page`](docbox_core::segment_page) consumes. The library is
//! initialized when a decoder is bound and never torn down; pdfium's global
//! teardown is unsafe to interleave with other users, so the binding is left
//! resident for the life of the process.

use std::os::raw::{c_double, c_int, c_uint, c_ulong, c_void};
use std::rc::Rc;

use pdfium_render::prelude::*;
use tracing::debug;

use docbox_core::{ExtractError, Glyph, Rgba, SourceType};

use crate::decoder::{DecodedPage, GlyphDecoder};

fn malformed() -> ExtractError {
    ExtractError::Malformed {
        format: SourceType::Pdf,
    }
}

/// A glyph decoder backed by a system pdfium library.
pub struct PdfiumDecoder {
    bindings: Rc<dyn PdfiumLibraryBindings>,
}

/// An open pdfium document. Owns a copy of the source bytes for as long as
/// pdfium needs them; the handle is closed on drop.
pub struct PdfiumDocument {
    bindings: Rc<dyn PdfiumLibraryBindings>,
    handle: FPDF_DOCUMENT,
    // pdfium reads from this buffer for the lifetime of the document.
    _data: Vec<u8>,
}

impl Drop for PdfiumDocument {
    fn drop(&mut self) {
        self.bindings.FPDF_CloseDocument(self.handle);
    }
}

impl PdfiumDecoder {
    /// Bind the system pdfium library and initialize it.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::BackendUnavailable`] when no pdfium library can
    /// be located at runtime.
    pub fn bind() -> Result<Self, ExtractError> {
        let bindings = Pdfium::bind_to_system_library().map_err(|err| {
            debug!(error = %err, "pdfium library not available");
            ExtractError::BackendUnavailable {
                format: SourceType::Pdf,
            }
        })?;
        bindings.FPDF_InitLibrary();
        Ok(Self {
            bindings: Rc::from(bindings),
        })
    }

    fn glyphs_for_page(&self, text_page: FPDF_TEXTPAGE) -> Vec<Glyph> {
        let count = self.bindings.FPDFText_CountChars(text_page);
        let mut glyphs = Vec::with_capacity(count.max(0) as usize);

        let mut index: c_int = 0;
        while index < count {
            let at = index;
            let mut codepoint = self.bindings.FPDFText_GetUnicode(text_page, index) as u32;
            // Combine UTF-16 surrogate pairs into one scalar value.
            if (0xD800..=0xDBFF).contains(&codepoint) && index + 1 < count {
                let low = self.bindings.FPDFText_GetUnicode(text_page, index + 1) as u32;
                if (0xDC00..=0xDFFF).contains(&low) {
                    codepoint = ((codepoint - 0xD800) << 10) + (low - 0xDC00) + 0x10000;
                    index += 1;
                }
            }
            index += 1;

            let mut left: c_double = 0.0;
            let mut right: c_double = 0.0;
            let mut bottom: c_double = 0.0;
            let mut top: c_double = 0.0;
            if self.bindings.FPDFText_GetCharBox(
                text_page,
                at,
                &mut left,
                &mut right,
                &mut bottom,
                &mut top,
            ) == 0
            {
                continue;
            }

            let mut name_buf = [0u8; 256];
            let mut flags: c_int = 0;
            let name_len = self.bindings.FPDFText_GetFontInfo(
                text_page,
                at,
                name_buf.as_mut_ptr() as *mut c_void,
                name_buf.len() as c_ulong,
                &mut flags,
            );
            let font_name = if name_len > 0 {
                let end = (name_len as usize).min(name_buf.len());
                String::from_utf8_lossy(&name_buf[..end])
                    .trim_end_matches('\0')
                    .to_string()
            } else {
                String::new()
            };

            let font_size = self.bindings.FPDFText_GetFontSize(text_page, at);

            let mut r: c_uint = 0;
            let mut g: c_uint = 0;
            let mut b: c_uint = 0;
            let mut a: c_uint = 255;
            self.bindings
                .FPDFText_GetFillColor(text_page, at, &mut r, &mut g, &mut b, &mut a);

            glyphs.push(Glyph {
                codepoint,
                left,
                right,
                bottom,
                top,
                font_name,
                font_flags: flags,
                font_size,
                fill: Rgba::new(r as u8, g as u8, b as u8, a as u8),
            });
        }

        glyphs
    }
}

impl GlyphDecoder for PdfiumDecoder {
    type Document = PdfiumDocument;

    fn open(&self, bytes: &[u8], password: Option<&str>) -> Result<Self::Document, ExtractError> {
        let data = bytes.to_vec();
        let handle = self.bindings.FPDF_LoadMemDocument64(&data, password);
        if handle.is_null() {
            return Err(malformed());
        }
        Ok(PdfiumDocument {
            bindings: Rc::clone(&self.bindings),
            handle,
            _data: data,
        })
    }

    fn page_count(&self, document: &Self::Document) -> usize {
        self.bindings.FPDF_GetPageCount(document.handle).max(0) as usize
    }

    fn decode_page(
        &self,
        document: &Self::Document,
        index: usize,
    ) -> Result<DecodedPage, ExtractError> {
        let page = self
            .bindings
            .FPDF_LoadPage(document.handle, index as c_int);
        if page.is_null() {
            return Err(malformed());
        }

        let width = self.bindings.FPDF_GetPageWidth(page);
        let height = self.bindings.FPDF_GetPageHeight(page);

        let text_page = self.bindings.FPDFText_LoadPage(page);
        if text_page.is_null() {
            self.bindings.FPDF_ClosePage(page);
            return Err(malformed());
        }

        let glyphs = self.glyphs_for_page(text_page);

        self.bindings.FPDFText_ClosePage(text_page);
        self.bindings.FPDF_ClosePage(page);

        Ok(DecodedPage {
            width,
            height,
            glyphs,
        })
    }
}
