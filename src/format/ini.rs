//! OIF main file parsing.
//!
//! The `.oif` main file is an INI document, normally UTF-16LE with a byte
//! order mark. Sections are `[Name]` lines and entries are `key=value` lines.
//! Values are typed on load: integer, then float, then boolean, otherwise a
//! string with one pair of surrounding quotes removed.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{MetadataError, OifError};

// =============================================================================
// Values
// =============================================================================

/// A typed value from the OIF main file.
#[derive(Debug, Clone, PartialEq)]
pub enum IniValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl IniValue {
    /// Type a raw value string.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        if let Ok(v) = raw.parse::<i64>() {
            return IniValue::Int(v);
        }
        if let Ok(v) = raw.parse::<f64>() {
            return IniValue::Float(v);
        }
        if raw.eq_ignore_ascii_case("true") {
            return IniValue::Bool(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return IniValue::Bool(false);
        }

        IniValue::Str(strip_quotes(raw).to_string())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            IniValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            IniValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for IniValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IniValue::Int(v) => write!(f, "{}", v),
            IniValue::Float(v) => f.write_str(&format_float(*v)),
            IniValue::Bool(true) => f.write_str("True"),
            IniValue::Bool(false) => f.write_str("False"),
            IniValue::Str(s) => f.write_str(s),
        }
    }
}

/// Remove one pair of matching surrounding quotes.
fn strip_quotes(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Format a float the way instrument metadata is conventionally rendered:
/// shortest round-trip digits, a trailing `.0` for integral values, and
/// scientific notation with a two-digit exponent outside `[1e-4, 1e16)`.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let abs = v.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let s = format!("{:e}", v);
        return match s.split_once('e') {
            Some((mantissa, exp)) => {
                let exp: i32 = exp.parse().unwrap_or(0);
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, exp.abs())
            }
            None => s,
        };
    }

    let s = format!("{}", v);
    if s.contains('.') {
        s
    } else {
        format!("{}.0", s)
    }
}

// =============================================================================
// Metadata Tree
// =============================================================================

/// Section name to key/value mapping of an OIF main file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataTree {
    sections: BTreeMap<String, BTreeMap<String, IniValue>>,
}

impl MetadataTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a main file from its raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, OifError> {
        let text = decode_text(bytes)?;
        Self::parse(&text)
    }

    /// Parse INI text.
    pub fn parse(text: &str) -> Result<Self, OifError> {
        let mut tree = MetadataTree::new();
        let mut current: Option<String> = None;

        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                let name = line[1..line.len() - 1].to_string();
                tree.sections.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };

            let section = current.as_ref().ok_or_else(|| OifError::MalformedIni {
                line: number + 1,
                message: format!("entry '{}' outside of any section", key.trim()),
            })?;

            tree.insert(section, key.trim(), IniValue::parse(value));
        }

        Ok(tree)
    }

    /// Insert or replace one entry, creating the section when needed.
    pub fn insert(&mut self, section: &str, key: &str, value: IniValue) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&IniValue> {
        self.sections.get(section).and_then(|s| s.get(key))
    }

    /// Look up an entry that must be present.
    pub fn require(&self, section: &str, key: &str) -> Result<&IniValue, MetadataError> {
        self.get(section, key).ok_or_else(|| MetadataError::MissingKey {
            section: section.to_string(),
            key: key.to_string(),
        })
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }
}

/// Decode main-file bytes, honouring a UTF-16 or UTF-8 byte order mark.
fn decode_text(bytes: &[u8]) -> Result<String, OifError> {
    let utf16 = |body: &[u8], from: fn([u8; 2]) -> u16| -> Result<String, OifError> {
        if body.len() % 2 != 0 {
            return Err(OifError::MalformedIni {
                line: 0,
                message: "odd byte count in UTF-16 text".to_string(),
            });
        }
        let units: Vec<u16> = body.chunks_exact(2).map(|c| from([c[0], c[1]])).collect();
        String::from_utf16(&units).map_err(|e| OifError::MalformedIni {
            line: 0,
            message: e.to_string(),
        })
    };

    match bytes {
        [0xFF, 0xFE, rest @ ..] => utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => utf16(rest, u16::from_be_bytes),
        [0xEF, 0xBB, 0xBF, rest @ ..] => std::str::from_utf8(rest)
            .map(str::to_string)
            .map_err(|e| OifError::MalformedIni {
                line: 0,
                message: e.to_string(),
            }),
        _ => std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| OifError::MalformedIni {
                line: 0,
                message: e.to_string(),
            }),
    }
}

/// Encode text as UTF-16LE with a byte order mark, the native main-file encoding.
pub fn encode_utf16le(text: &str) -> Vec<u8> {
    let mut out = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}
