//! Namespace-insensitive XML event helpers.
//!
//! OOXML documents qualify element and attribute names with namespace
//! prefixes (`w:tbl`, `r:id`) that vary between producers, so matching is
//! done on the local part only.

use quick_xml::events::BytesStart;

/// Strip any namespace prefix from a qualified name.
pub fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Look up an attribute by local name, unescaping its value.
pub fn attr_value(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    for attr in element.attributes().with_checks(false) {
        let attr = attr.ok()?;
        if local_name(attr.key.as_ref()) == key {
            if let Ok(value) = attr.unescape_value() {
                return Some(value.into_owned());
            }
        }
    }
    None
}

/// Look up an attribute and parse it as a positive integer, falling back to
/// `default` when absent, unparsable, or not positive.
pub fn attr_positive_int(element: &BytesStart<'_>, key: &[u8], default: u32) -> u32 {
    attr_value(element, key)
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|&value| value > 0)
        .unwrap_or(default)
}
