//! Insertion-ordered intern tables for fonts and styles.
//!
//! Both tables assign dense ids in insertion order: the id of a new entry is
//! the table size before insertion. Looking up an existing key returns the id
//! assigned at first insertion. The emitted ids therefore depend only on the
//! backend's emission order for a given input.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Font weight of a style. Only the two values the model distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// Regular weight.
    Normal,
    /// Bold weight.
    Bold,
}

impl FontWeight {
    /// The lowercase tag used in views and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        }
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One interned font: a dense id and the exact name it was interned under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontEntry {
    /// Dense id, equal to the entry's position in the table.
    pub id: u32,
    /// Font name; a missing name is normalized to the empty string.
    pub name: String,
}

/// Interns font names to dense ids, preserving insertion order.
///
/// Names are compared by exact byte equality.
#[derive(Debug, Clone, Default)]
pub struct FontTable {
    map: HashMap<String, u32>,
    entries: Vec<FontEntry>,
}

impl FontTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a font name, returning its id.
    pub fn intern(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.map.get(name) {
            return id;
        }
        let id = self.entries.len() as u32;
        self.map.insert(name.to_string(), id);
        self.entries.push(FontEntry {
            id,
            name: name.to_string(),
        });
        id
    }

    /// Number of interned fonts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no font has been interned.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[FontEntry] {
        &self.entries
    }
}

/// One interned style: the dense id plus the full key it was interned under.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleEntry {
    /// Dense id, equal to the entry's position in the table.
    pub id: u32,
    /// Id into the font table.
    pub font_id: u32,
    /// Font size in backend-native units.
    pub font_size: f64,
    /// Canonical `rgba(R,G,B,A)` color string.
    pub color: String,
    /// Font weight.
    pub weight: FontWeight,
    /// Italic flag.
    pub italic: bool,
    /// Underline flag.
    pub underline: bool,
}

/// The composite lookup key. `font_size` is compared by bit pattern so that
/// lookups are exact and the key stays hashable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StyleKey {
    font_id: u32,
    size_bits: u64,
    color: String,
    weight: FontWeight,
    italic: bool,
    underline: bool,
}

/// Interns `(font_id, font_size, color, weight, italic, underline)` tuples to
/// dense ids, preserving insertion order.
#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    map: HashMap<StyleKey, u32>,
    entries: Vec<StyleEntry>,
}

impl StyleTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a style tuple, returning its id.
    pub fn intern(
        &mut self,
        font_id: u32,
        font_size: f64,
        color: &str,
        weight: FontWeight,
        italic: bool,
        underline: bool,
    ) -> u32 {
        let key = StyleKey {
            font_id,
            size_bits: font_size.to_bits(),
            color: color.to_string(),
            weight,
            italic,
            underline,
        };
        if let Some(&id) = self.map.get(&key) {
            return id;
        }
        let id = self.entries.len() as u32;
        self.map.insert(key, id);
        self.entries.push(StyleEntry {
            id,
            font_id,
            font_size,
            color: color.to_string(),
            weight,
            italic,
            underline,
        });
        id
    }

    /// Number of interned styles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no style has been interned.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[StyleEntry] {
        &self.entries
    }
}
