//! Word-processor table layout.
//!
//! Every `w:tbl` that is a direct child of `w:body` in `word/document.xml`
//! becomes one page; rows and cells map to the page grid. `w:gridSpan` widens
//! a cell, and a `w:vMerge` without a `w:val` attribute marks a continuation
//! cell that advances the column counter without emitting anything. All boxes
//! share one default style.

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use docbox_core::{BBox, ExtractError, ExtractResult, FontWeight, Page, SourceType};

use crate::container::Container;
use crate::xml::{attr_positive_int, attr_value, local_name};

const DOCX_FONT: &str = "default";
const DOCX_FONT_SIZE: f64 = 12.0;
const DOCX_COLOR: &str = "rgba(0,0,0,255)";

const DOCUMENT_ENTRY: &str = "word/document.xml";

/// State for the cell currently being collected.
#[derive(Default)]
struct CellState {
    text: String,
    colspan: u32,
    vmerge_continue: bool,
    para_seen: bool,
}

/// Extract a word-processor document.
pub fn extract_docx(bytes: &[u8]) -> Result<ExtractResult, ExtractError> {
    if bytes.is_empty() {
        return Err(ExtractError::EmptySource);
    }

    let mut container = Container::open(bytes, SourceType::Docx)?;
    let document = container.read(DOCUMENT_ENTRY)?;

    let mut result = ExtractResult::new(SourceType::Docx);
    let font_id = result.fonts.intern(DOCX_FONT);
    let style_id = result.styles.intern(
        font_id,
        DOCX_FONT_SIZE,
        DOCX_COLOR,
        FontWeight::Normal,
        false,
        false,
    );

    let mut reader = Reader::from_reader(&document[..]);
    let mut buf = Vec::new();

    let mut seen_body = false;
    let mut in_body = false;
    // Open elements below w:body; a w:tbl starting at depth 0 is a page.
    let mut body_depth = 0u32;
    // Nesting level of open w:tbl elements; content below level 1 is ignored.
    let mut tbl_depth = 0u32;

    let mut row_num = 0u32;
    let mut max_col = 0u32;
    let mut next_col = 1u32;
    let mut in_cell = false;
    let mut in_text = false;
    let mut cell = CellState::default();
    let mut bboxes: Vec<BBox> = Vec::new();

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let qname = e.name();
                let name = local_name(qname.as_ref());
                if !in_body {
                    if name == b"body" {
                        seen_body = true;
                        in_body = true;
                        body_depth = 0;
                    }
                    continue;
                }
                match name {
                    b"tbl" => {
                        if tbl_depth > 0 {
                            tbl_depth += 1;
                        } else if body_depth == 0 {
                            tbl_depth = 1;
                            row_num = 0;
                            max_col = 0;
                            bboxes.clear();
                        }
                    }
                    b"tr" if tbl_depth == 1 => {
                        row_num += 1;
                        next_col = 1;
                    }
                    b"tc" if tbl_depth == 1 => {
                        in_cell = true;
                        cell = CellState {
                            colspan: 1,
                            ..CellState::default()
                        };
                    }
                    b"gridSpan" if in_cell && tbl_depth == 1 => {
                        cell.colspan = attr_positive_int(e, b"val", 1);
                    }
                    b"vMerge" if in_cell && tbl_depth == 1 => {
                        if attr_value(e, b"val").is_none() {
                            cell.vmerge_continue = true;
                        }
                    }
                    b"p" if in_cell && tbl_depth == 1 => {
                        if cell.para_seen {
                            cell.text.push('\n');
                        }
                        cell.para_seen = true;
                    }
                    b"t" if in_cell && tbl_depth == 1 => in_text = true,
                    _ => {}
                }
                body_depth += 1;
            }
            Ok(Event::Empty(ref e)) => {
                if !in_body {
                    continue;
                }
                match local_name(e.name().as_ref()) {
                    b"gridSpan" if in_cell && tbl_depth == 1 => {
                        cell.colspan = attr_positive_int(e, b"val", 1);
                    }
                    b"vMerge" if in_cell && tbl_depth == 1 => {
                        if attr_value(e, b"val").is_none() {
                            cell.vmerge_continue = true;
                        }
                    }
                    b"p" if in_cell && tbl_depth == 1 => {
                        if cell.para_seen {
                            cell.text.push('\n');
                        }
                        cell.para_seen = true;
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref t)) => {
                if in_text && in_cell && tbl_depth == 1 {
                    if let Ok(text) = t.unescape() {
                        cell.text.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                if !in_body {
                    continue;
                }
                let qname = e.name();
                let name = local_name(qname.as_ref());
                if name == b"body" && body_depth == 0 {
                    in_body = false;
                    continue;
                }
                body_depth = body_depth.saturating_sub(1);
                match name {
                    b"t" => in_text = false,
                    b"tc" if tbl_depth == 1 && in_cell => {
                        in_cell = false;
                        if !cell.vmerge_continue {
                            let mut text = std::mem::take(&mut cell.text);
                            while text.ends_with(' ') || text.ends_with('\t') {
                                text.pop();
                            }
                            if !text.is_empty() {
                                bboxes.push(BBox {
                                    page_id: 0, // stamped when the table closes
                                    style_id,
                                    x: f64::from(next_col),
                                    y: f64::from(row_num),
                                    w: f64::from(cell.colspan),
                                    h: 1.0,
                                    text,
                                    formula: None,
                                });
                            }
                        }
                        next_col += cell.colspan;
                    }
                    b"tr" if tbl_depth == 1 => {
                        if next_col - 1 > max_col {
                            max_col = next_col - 1;
                        }
                    }
                    b"tbl" => {
                        if tbl_depth > 1 {
                            tbl_depth -= 1;
                        } else if tbl_depth == 1 {
                            tbl_depth = 0;
                            let page_id = result.pages.len() as u32;
                            let mut boxes = std::mem::take(&mut bboxes);
                            for bbox in &mut boxes {
                                bbox.page_id = page_id;
                            }
                            debug!(
                                table = page_id + 1,
                                rows = row_num,
                                cols = max_col,
                                boxes = boxes.len(),
                                "docx table extracted"
                            );
                            result.pages.push(Page {
                                page_id,
                                document_id: 0,
                                page_number: page_id as i32 + 1,
                                width: f64::from(max_col),
                                height: f64::from(row_num),
                                bboxes: boxes,
                            });
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(_) => {
                return Err(ExtractError::Malformed {
                    format: SourceType::Docx,
                })
            }
        }
    }

    if !seen_body {
        return Err(ExtractError::Malformed {
            format: SourceType::Docx,
        });
    }

    result.page_count = result.pages.len() as i32;
    Ok(result)
}
