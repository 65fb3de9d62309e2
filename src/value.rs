use crate::patch::{Format, PatchError};
use serde::Deserialize;
use std::fmt;

/// Caller-declared kind of a replacement value.
///
/// The kind is never inferred from content: the same textual input
/// (`"50"`) may need to land as a JSON string `"50"` or a bare number
/// `50` depending on the target field, so the caller declares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueKind {
    Boolean,
    String,
    Numeric,
    /// Substituted verbatim, with no quoting or escaping. The only kind
    /// exempt from the output-validity guarantee.
    Raw,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Boolean => "boolean",
            ValueKind::String => "string",
            ValueKind::Numeric => "numeric",
            ValueKind::Raw => "raw",
        };
        write!(f, "{name}")
    }
}

/// A typed replacement value: the caller's payload bytes plus the kind
/// tag that decides how they are rendered into the target grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceValue {
    kind: ValueKind,
    value: Vec<u8>,
}

impl ReplaceValue {
    pub fn boolean(value: bool) -> Self {
        Self {
            kind: ValueKind::Boolean,
            value: if value { b"true".to_vec() } else { b"false".to_vec() },
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::String,
            value: value.into().into_bytes(),
        }
    }

    /// A bare numeric literal. The payload is kept textual so the caller
    /// controls its formatting, but it must parse as a JSON number.
    pub fn numeric(value: impl Into<String>) -> Result<Self, PatchError> {
        let value = value.into();
        if !is_json_number(value.as_bytes()) {
            return Err(PatchError::InvalidLiteral {
                kind: ValueKind::Numeric,
                value,
            });
        }
        Ok(Self {
            kind: ValueKind::Numeric,
            value: value.into_bytes(),
        })
    }

    pub fn raw(value: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: ValueKind::Raw,
            value: value.into(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Render the exact bytes to splice into a value slot of the given
    /// format: JSON strings gain surrounding quotes and interior
    /// escaping, booleans render bare, and so on.
    pub fn render(&self, format: Format) -> Result<Vec<u8>, PatchError> {
        match format {
            Format::Json => self.render_json(),
            Format::Properties => self.render_properties(),
            other => Err(PatchError::UnsupportedValueKind {
                kind: self.kind,
                format: other,
            }),
        }
    }

    fn render_json(&self) -> Result<Vec<u8>, PatchError> {
        match self.kind {
            ValueKind::Boolean | ValueKind::Numeric | ValueKind::Raw => Ok(self.value.clone()),
            ValueKind::String => {
                let text = self.utf8_payload()?;
                Ok(escape_json_string(text).into_bytes())
            }
        }
    }

    fn render_properties(&self) -> Result<Vec<u8>, PatchError> {
        match self.kind {
            ValueKind::Boolean | ValueKind::Numeric | ValueKind::Raw => Ok(self.value.clone()),
            ValueKind::String => {
                let text = self.utf8_payload()?;
                Ok(escape_properties_value(text).into_bytes())
            }
        }
    }

    fn utf8_payload(&self) -> Result<&str, PatchError> {
        std::str::from_utf8(&self.value).map_err(|_| PatchError::InvalidLiteral {
            kind: self.kind,
            value: String::from_utf8_lossy(&self.value).into_owned(),
        })
    }
}

/// Quote and escape `text` as a JSON string literal.
fn escape_json_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Escape `text` for a java-properties value slot. Values are unquoted,
/// so only backslash and line-structure characters need escaping.
fn escape_properties_value(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// Full JSON number grammar: `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`.
pub(crate) fn is_json_number(s: &[u8]) -> bool {
    let byte = |i: usize| s.get(i).copied();
    let mut i = 0;

    if byte(i) == Some(b'-') {
        i += 1;
    }
    match byte(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            while matches!(byte(i), Some(b'0'..=b'9')) {
                i += 1;
            }
        }
        _ => return false,
    }
    if byte(i) == Some(b'.') {
        i += 1;
        if !matches!(byte(i), Some(b'0'..=b'9')) {
            return false;
        }
        while matches!(byte(i), Some(b'0'..=b'9')) {
            i += 1;
        }
    }
    if matches!(byte(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(byte(i), Some(b'+' | b'-')) {
            i += 1;
        }
        if !matches!(byte(i), Some(b'0'..=b'9')) {
            return false;
        }
        while matches!(byte(i), Some(b'0'..=b'9')) {
            i += 1;
        }
    }

    i == s.len()
}
