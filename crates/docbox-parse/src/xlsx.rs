//! Spreadsheet cell layout.
//!
//! Each worksheet in the requested range becomes one page whose grid is
//! columns × rows. Cells carry their display string, an optional formula, and
//! the font formatting resolved through the workbook's style sheet. Merged
//! ranges emit only from their top-left origin; every other covered cell is
//! skipped.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use docbox_core::{BBox, ExtractError, ExtractResult, FontWeight, Page, Rgba, SourceType};

use crate::container::Container;
use crate::xml::{attr_value, local_name};

const WORKBOOK_ENTRY: &str = "xl/workbook.xml";
const RELATIONSHIPS_ENTRY: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_ENTRY: &str = "xl/sharedStrings.xml";
const STYLES_ENTRY: &str = "xl/styles.xml";

const DEFAULT_FONT: &str = "default";
const DEFAULT_FONT_SIZE: f64 = 11.0;
const DEFAULT_COLOR: &str = "rgba(0,0,0,255)";

fn malformed() -> ExtractError {
    ExtractError::Malformed {
        format: SourceType::Xlsx,
    }
}

/// One sheet as declared in `xl/workbook.xml`.
#[derive(Debug)]
struct SheetInfo {
    sheet_id: Option<u32>,
    rel_id: Option<String>,
}

/// One font record from `xl/styles.xml`.
#[derive(Debug, Clone)]
struct SheetFont {
    name: String,
    size: f64,
    bold: bool,
    italic: bool,
    underline: bool,
    /// Canonical color string when the record stored 8-hex ARGB.
    color: Option<String>,
}

impl Default for SheetFont {
    fn default() -> Self {
        Self {
            name: DEFAULT_FONT.to_string(),
            size: DEFAULT_FONT_SIZE,
            bold: false,
            italic: false,
            underline: false,
            color: None,
        }
    }
}

/// One `cellXfs` record: the font it references and whether it applies.
#[derive(Debug, Clone, Copy, Default)]
struct CellFormat {
    font_index: usize,
    apply_font: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct MergeRange {
    start_row: u32,
    start_col: u32,
    end_row: u32,
    end_col: u32,
}

impl MergeRange {
    fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }

    fn is_origin(&self, row: u32, col: u32) -> bool {
        row == self.start_row && col == self.start_col
    }
}

/// One `<c>` element, with its display string already resolved.
#[derive(Debug)]
struct RawCell {
    row: u32,
    col: u32,
    format: Option<usize>,
    value: Option<String>,
    formula: Option<String>,
}

#[derive(Debug, Default)]
struct SheetData {
    cells: Vec<RawCell>,
    merges: Vec<MergeRange>,
    max_row: u32,
    max_col: u32,
}

/// Parse `"BC23"` into `(row, column)`, both 1-based.
fn parse_cell_ref(reference: &str) -> Option<(u32, u32)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let mut col = 0u32;
    for b in letters.bytes() {
        let v = match b {
            b'A'..=b'Z' => u32::from(b - b'A') + 1,
            b'a'..=b'z' => u32::from(b - b'a') + 1,
            _ => return None,
        };
        col = col.checked_mul(26)?.checked_add(v)?;
    }
    let row = digits.parse::<u32>().ok().filter(|&r| r > 0)?;
    Some((row, col))
}

/// Parse `"A1:B2"` into a merge range. A single-cell ref merges with itself.
fn parse_merge_ref(reference: &str) -> Option<MergeRange> {
    let (first, second) = match reference.split_once(':') {
        Some(pair) => pair,
        None => (reference, reference),
    };
    let (start_row, start_col) = parse_cell_ref(first)?;
    let (end_row, end_col) = parse_cell_ref(second)?;
    Some(MergeRange {
        start_row: start_row.min(end_row),
        start_col: start_col.min(end_col),
        end_row: start_row.max(end_row),
        end_col: start_col.max(end_col),
    })
}

/// A flag element such as `<b/>` or `<b val="0"/>`.
fn flag_is_set(value: Option<String>) -> bool {
    !matches!(value.as_deref(), Some("0") | Some("false"))
}

fn parse_workbook(data: &[u8]) -> Result<Vec<SheetInfo>, ExtractError> {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();
    let mut sheets = Vec::new();
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if local_name(e.name().as_ref()) == b"sheet" =>
            {
                sheets.push(SheetInfo {
                    sheet_id: attr_value(e, b"sheetId").and_then(|v| v.parse().ok()),
                    rel_id: attr_value(e, b"id"),
                });
            }
            Ok(Event::Eof) => break,
            Err(_) => return Err(malformed()),
            _ => {}
        }
    }
    Ok(sheets)
}

fn parse_relationships(data: &[u8]) -> Result<HashMap<String, String>, ExtractError> {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();
    let mut relationships = HashMap::new();
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                if let (Some(id), Some(target)) =
                    (attr_value(e, b"Id"), attr_value(e, b"Target"))
                {
                    relationships.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => return Err(malformed()),
            _ => {}
        }
    }
    Ok(relationships)
}

fn parse_shared_strings(data: &[u8]) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;
    let mut in_phonetic = false;
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"t" if in_si && !in_phonetic => in_t = true,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Ok(Event::Text(ref t)) => {
                if in_t {
                    if let Ok(text) = t.unescape() {
                        current.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"t" => in_t = false,
                b"rPh" => in_phonetic = false,
                b"si" => {
                    in_si = false;
                    strings.push(std::mem::take(&mut current));
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => return Err(malformed()),
            _ => {}
        }
    }
    Ok(strings)
}

fn parse_styles(data: &[u8]) -> Result<(Vec<SheetFont>, Vec<CellFormat>), ExtractError> {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();
    let mut fonts = Vec::new();
    let mut formats = Vec::new();
    let mut in_fonts = false;
    let mut in_cell_xfs = false;
    let mut current: Option<SheetFont> = None;

    fn apply_font_child(
        current: &mut Option<SheetFont>,
        name: &[u8],
        e: &quick_xml::events::BytesStart<'_>,
    ) {
        let Some(font) = current.as_mut() else {
            return;
        };
        match name {
            b"name" => {
                if let Some(value) = attr_value(e, b"val") {
                    font.name = value;
                }
            }
            b"sz" => {
                if let Some(size) = attr_value(e, b"val").and_then(|v| v.parse().ok()) {
                    font.size = size;
                }
            }
            b"b" => font.bold = flag_is_set(attr_value(e, b"val")),
            b"i" => font.italic = flag_is_set(attr_value(e, b"val")),
            b"u" => font.underline = !matches!(attr_value(e, b"val").as_deref(), Some("none")),
            b"color" => {
                font.color = match attr_value(e, b"rgb") {
                    Some(hex) => match Rgba::from_argb_hex(&hex) {
                        Some(rgba) => Some(rgba.to_css()),
                        None => {
                            debug!(value = %hex, "unsupported color encoding, using default");
                            None
                        }
                    },
                    // Theme and indexed colors fall back to the default.
                    None => None,
                };
            }
            _ => {}
        }
    }

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let qname = e.name();
                let name = local_name(qname.as_ref());
                match name {
                    b"fonts" => in_fonts = true,
                    b"cellXfs" => in_cell_xfs = true,
                    b"font" if in_fonts => current = Some(SheetFont::default()),
                    b"xf" if in_cell_xfs => formats.push(CellFormat {
                        font_index: attr_value(e, b"fontId")
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(0),
                        apply_font: matches!(
                            attr_value(e, b"applyFont").as_deref(),
                            Some("1") | Some("true")
                        ),
                    }),
                    _ => apply_font_child(&mut current, name, e),
                }
            }
            Ok(Event::Empty(ref e)) => {
                let qname = e.name();
                let name = local_name(qname.as_ref());
                match name {
                    b"font" if in_fonts => fonts.push(SheetFont::default()),
                    b"xf" if in_cell_xfs => formats.push(CellFormat {
                        font_index: attr_value(e, b"fontId")
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(0),
                        apply_font: matches!(
                            attr_value(e, b"applyFont").as_deref(),
                            Some("1") | Some("true")
                        ),
                    }),
                    _ => apply_font_child(&mut current, name, e),
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"fonts" => in_fonts = false,
                b"cellXfs" => in_cell_xfs = false,
                b"font" => {
                    if let Some(font) = current.take() {
                        fonts.push(font);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => return Err(malformed()),
            _ => {}
        }
    }
    Ok((fonts, formats))
}

fn parse_sheet(data: &[u8], shared: &[String]) -> Result<SheetData, ExtractError> {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();
    let mut sheet = SheetData::default();

    let mut current_row = 0u32;
    let mut next_col = 1u32;

    // State for the <c> element being read.
    let mut cell: Option<RawCell> = None;
    let mut cell_type: Option<String> = None;
    let mut value_buf = String::new();
    let mut formula_buf = String::new();
    let mut in_value = false;
    let mut in_formula = false;
    let mut in_inline_t = false;
    let mut inline_buf = String::new();

    fn start_cell(
        e: &quick_xml::events::BytesStart<'_>,
        current_row: u32,
        next_col: &mut u32,
    ) -> (RawCell, Option<String>) {
        let (row, col) = attr_value(e, b"r")
            .and_then(|r| parse_cell_ref(&r))
            .unwrap_or((current_row, *next_col));
        *next_col = col + 1;
        (
            RawCell {
                row,
                col,
                format: attr_value(e, b"s").and_then(|v| v.parse().ok()),
                value: None,
                formula: None,
            },
            attr_value(e, b"t"),
        )
    }

    fn finish_cell(
        sheet: &mut SheetData,
        shared: &[String],
        mut cell: RawCell,
        cell_type: Option<String>,
        value_buf: &str,
        formula_buf: &str,
        inline_buf: &str,
    ) {
        let value = match cell_type.as_deref() {
            Some("s") => value_buf
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| shared.get(idx).cloned()),
            Some("inlineStr") => Some(inline_buf.to_string()),
            Some("b") if !value_buf.is_empty() => Some(if value_buf.trim() == "1" {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }),
            // "str" (formula results), "e" (errors), "n", and untyped
            // numerics all display their raw stored text.
            _ => {
                if value_buf.is_empty() {
                    None
                } else {
                    Some(value_buf.to_string())
                }
            }
        };
        cell.value = value;
        if !formula_buf.is_empty() {
            cell.formula = Some(formula_buf.to_string());
        }
        if cell.row > sheet.max_row {
            sheet.max_row = cell.row;
        }
        if cell.col > sheet.max_col {
            sheet.max_col = cell.col;
        }
        sheet.cells.push(cell);
    }

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"row" => {
                    current_row = attr_value(e, b"r")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(current_row + 1);
                    next_col = 1;
                }
                b"c" => {
                    let (raw, ty) = start_cell(e, current_row, &mut next_col);
                    cell = Some(raw);
                    cell_type = ty;
                    value_buf.clear();
                    formula_buf.clear();
                    inline_buf.clear();
                }
                b"v" if cell.is_some() => in_value = true,
                b"f" if cell.is_some() => in_formula = true,
                b"t" if cell.is_some() => in_inline_t = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"row" => {
                    current_row = attr_value(e, b"r")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(current_row + 1);
                    next_col = 1;
                }
                b"c" => {
                    let (raw, ty) = start_cell(e, current_row, &mut next_col);
                    finish_cell(&mut sheet, shared, raw, ty, "", "", "");
                }
                b"mergeCell" => {
                    if let Some(range) = attr_value(e, b"ref").and_then(|r| parse_merge_ref(&r)) {
                        sheet.merges.push(range);
                    }
                }
                _ => {}
            },
            Ok(Event::Text(ref t)) => {
                if let Ok(text) = t.unescape() {
                    if in_value {
                        value_buf.push_str(&text);
                    } else if in_formula {
                        formula_buf.push_str(&text);
                    } else if in_inline_t {
                        inline_buf.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"v" => in_value = false,
                b"f" => in_formula = false,
                b"t" => in_inline_t = false,
                b"c" => {
                    if let Some(raw) = cell.take() {
                        finish_cell(
                            &mut sheet,
                            shared,
                            raw,
                            cell_type.take(),
                            &value_buf,
                            &formula_buf,
                            &inline_buf,
                        );
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => return Err(malformed()),
            _ => {}
        }
    }

    sheet.cells.sort_by_key(|c| (c.row, c.col));
    Ok(sheet)
}

/// Turn a relationship target into a container entry path.
fn normalize_target(target: &str) -> String {
    if let Some(stripped) = target.strip_prefix('/') {
        stripped.to_string()
    } else if target.starts_with("xl/") {
        target.to_string()
    } else if let Some(stripped) = target.strip_prefix("../") {
        format!("xl/{stripped}")
    } else {
        format!("xl/{target}")
    }
}

fn resolve_sheet_entry(
    info: &SheetInfo,
    relationships: &HashMap<String, String>,
    entry_names: &[String],
    index: usize,
) -> Option<String> {
    let find = |path: &str| {
        entry_names
            .iter()
            .find(|name| name.eq_ignore_ascii_case(path))
            .cloned()
    };
    if let Some(target) = info.rel_id.as_ref().and_then(|id| relationships.get(id)) {
        if let Some(actual) = find(&normalize_target(target)) {
            return Some(actual);
        }
    }
    let sheet_id = info.sheet_id.unwrap_or(index as u32 + 1);
    find(&format!("xl/worksheets/sheet{sheet_id}.xml"))
}

/// Extract a workbook.
///
/// `start_page`/`end_page` select sheets, 1-based inclusive; `(0, 0)` selects
/// every sheet. The upper bound clamps to the sheet count; a range that is
/// empty after clamping fails. The password is accepted opaquely; encrypted
/// workbooks are not ZIP containers and fail as malformed.
pub fn extract_xlsx(
    bytes: &[u8],
    _password: Option<&str>,
    start_page: i32,
    end_page: i32,
) -> Result<ExtractResult, ExtractError> {
    if bytes.is_empty() {
        return Err(ExtractError::EmptySource);
    }

    let mut container = Container::open(bytes, SourceType::Xlsx)?;
    let entry_names = container.entry_names();

    let sheets = parse_workbook(&container.read(WORKBOOK_ENTRY)?)?;
    let relationships = match container.read_optional(RELATIONSHIPS_ENTRY)? {
        Some(data) => parse_relationships(&data)?,
        None => HashMap::new(),
    };
    let shared = match container.read_optional(SHARED_STRINGS_ENTRY)? {
        Some(data) => parse_shared_strings(&data)?,
        None => Vec::new(),
    };
    let (sheet_fonts, cell_formats) = match container.read_optional(STYLES_ENTRY)? {
        Some(data) => parse_styles(&data)?,
        None => (Vec::new(), Vec::new()),
    };

    let sheet_count = sheets.len() as i32;
    let start = if start_page > 0 { start_page } else { 1 };
    let end = if end_page > 0 {
        end_page.min(sheet_count)
    } else {
        sheet_count
    };
    // Covers the zero-sheet workbook too: end clamps to 0, start stays >= 1.
    if start > end {
        return Err(ExtractError::EmptyPageRange {
            start: start_page,
            end: end_page,
        });
    }

    let mut result = ExtractResult::new(SourceType::Xlsx);
    result.page_count = sheet_count;

    for sheet_index in (start as usize - 1)..(end as usize) {
        let info = &sheets[sheet_index];
        let entry = resolve_sheet_entry(info, &relationships, &entry_names, sheet_index)
            .ok_or_else(|| ExtractError::MissingEntry {
                name: format!("xl/worksheets/sheet{}.xml", sheet_index + 1),
            })?;
        let sheet = parse_sheet(&container.read(&entry)?, &shared)?;

        let page_id = result.pages.len() as u32;
        let mut page = Page {
            page_id,
            document_id: 0,
            page_number: sheet_index as i32 + 1,
            width: f64::from(sheet.max_col),
            height: f64::from(sheet.max_row),
            bboxes: Vec::new(),
        };

        for cell in &sheet.cells {
            // Merged regions emit only from their top-left origin.
            let merge = sheet.merges.iter().find(|m| m.contains(cell.row, cell.col));
            if let Some(merge) = merge {
                if !merge.is_origin(cell.row, cell.col) {
                    continue;
                }
            }
            if cell.value.is_none() && cell.format.is_none() {
                continue;
            }

            let mut text = cell.value.clone().unwrap_or_default();
            while text.ends_with(' ') || text.ends_with('\t') {
                text.pop();
            }
            if text.is_empty() {
                continue;
            }

            let font = cell
                .format
                .and_then(|idx| cell_formats.get(idx))
                .filter(|format| format.apply_font)
                .and_then(|format| sheet_fonts.get(format.font_index).cloned())
                .unwrap_or_default();

            let font_id = result.fonts.intern(&font.name);
            let weight = if font.bold {
                FontWeight::Bold
            } else {
                FontWeight::Normal
            };
            let color = font.color.as_deref().unwrap_or(DEFAULT_COLOR);
            let style_id = result.styles.intern(
                font_id,
                font.size,
                color,
                weight,
                font.italic,
                font.underline,
            );

            let (w, h) = match merge {
                Some(m) => (
                    f64::from(m.end_col - m.start_col + 1),
                    f64::from(m.end_row - m.start_row + 1),
                ),
                None => (1.0, 1.0),
            };

            page.bboxes.push(BBox {
                page_id,
                style_id,
                x: f64::from(cell.col),
                y: f64::from(cell.row),
                w,
                h,
                text,
                formula: cell.formula.as_ref().map(|f| format!("={f}")),
            });
        }

        debug!(
            sheet = sheet_index + 1,
            cells = sheet.cells.len(),
            boxes = page.bboxes.len(),
            "xlsx sheet extracted"
        );
        result.pages.push(page);
    }

    Ok(result)
}
