use crate::edit::{apply_edits, Edit, EditError, Span};
use crate::selector::{PathPart, Selector};
use crate::value::{ReplaceValue, ValueKind};
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Grammar of a configuration file. Determines which positional scanner
/// is used; selecting a format without a registered scanner fails with
/// [`PatchError::NoSuchFormatParser`] before any input is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    Json,
    Yaml,
    Properties,
    Xml,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Properties => "properties",
            Format::Xml => "xml",
        };
        write!(f, "{name}")
    }
}

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("malformed input at byte {offset}: {message}")]
    MalformedInput { offset: usize, message: String },

    #[error("value kind {kind} is not supported for {format} documents")]
    UnsupportedValueKind { kind: ValueKind, format: Format },

    #[error("invalid {kind} literal: {value}")]
    InvalidLiteral { kind: ValueKind, value: String },

    #[error("no parser registered for {0} documents")]
    NoSuchFormatParser(Format),

    #[error("invalid selector '{input}': {message}")]
    InvalidSelector { input: String, message: String },

    #[error("edit error: {0}")]
    Edit(#[from] EditError),
}

/// One (key-path, value-span) observation emitted by a format scanner
/// during its single forward pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueObservation {
    pub path: Vec<PathPart>,
    pub span: Span,
    /// Bytes the grammar requires ahead of any substituted value at this
    /// slot. Empty almost everywhere; a properties key written without a
    /// separator carries `=` here so a replacement never fuses onto the
    /// key.
    pub prefix: Vec<u8>,
}

/// A (selector, replacement value) rule.
#[derive(Debug, Clone)]
pub struct Replacement {
    pub selector: Selector,
    pub value: ReplaceValue,
}

impl Replacement {
    pub fn new(selector: Selector, value: ReplaceValue) -> Self {
        Self { selector, value }
    }
}

/// A patch request against one configuration file: a diagnostic name, a
/// format selector, and an ordered collection of replacement rules.
///
/// The value is immutable during an update call and carries no state
/// between calls; it is safe to apply the same `ConfigurationFile` to
/// any number of buffers, concurrently or repeatedly, with byte-for-byte
/// deterministic results.
#[derive(Debug, Clone)]
pub struct ConfigurationFile {
    /// Opaque to the engine, used only for diagnostics
    pub file_name: String,
    pub format: Format,
    pub replacements: Vec<Replacement>,
}

impl ConfigurationFile {
    pub fn new(
        file_name: impl Into<String>,
        format: Format,
        replacements: Vec<Replacement>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            format,
            replacements,
        }
    }

    /// Patch `original` according to the replacement rules, dispatching
    /// on the format selector.
    ///
    /// Every byte outside a matched value span is preserved verbatim:
    /// key order, whitespace, comments, quoting style and unrelated keys
    /// survive bit-for-bit. Rules whose selector matches nothing are
    /// silently inert. Any failure aborts the whole operation; no
    /// partially patched buffer is ever returned.
    pub fn update_preserving_structure(&self, original: &[u8]) -> Result<Vec<u8>, PatchError> {
        match self.format {
            Format::Json => self.update_json_preserving_structure(original),
            Format::Properties => self.update_properties_preserving_structure(original),
            other => Err(PatchError::NoSuchFormatParser(other)),
        }
    }

    /// Patch `original` as JSON, regardless of the format selector.
    pub fn update_json_preserving_structure(&self, original: &[u8]) -> Result<Vec<u8>, PatchError> {
        let observations = crate::json::scan(original)?;
        let edits = plan_edits(&observations, &self.replacements, Format::Json)?;
        Ok(apply_edits(original, &edits)?)
    }

    /// Patch `original` as a properties file, regardless of the format
    /// selector.
    pub fn update_properties_preserving_structure(
        &self,
        original: &[u8],
    ) -> Result<Vec<u8>, PatchError> {
        let observations = crate::properties::scan(original)?;
        let edits = plan_edits(&observations, &self.replacements, Format::Properties)?;
        Ok(apply_edits(original, &edits)?)
    }
}

/// Resolve rule matches against scanner observations and plan the edit
/// list: at most one edit per observed span, with the last-listed rule
/// winning when several selectors match the same path. Output is sorted
/// by ascending start offset.
pub(crate) fn plan_edits(
    observations: &[ValueObservation],
    replacements: &[Replacement],
    format: Format,
) -> Result<Vec<Edit>, PatchError> {
    let mut edits = Vec::new();
    for observation in observations {
        let matched = replacements
            .iter()
            .rev()
            .find(|rule| rule.selector.matches(&observation.path));
        if let Some(rule) = matched {
            let rendered = rule.value.render(format)?;
            let new_bytes = if observation.prefix.is_empty() {
                rendered
            } else {
                let mut bytes = observation.prefix.clone();
                bytes.extend_from_slice(&rendered);
                bytes
            };
            edits.push(Edit::new(observation.span, new_bytes));
        }
    }
    edits.sort_by_key(|edit| edit.span.start);
    Ok(edits)
}
