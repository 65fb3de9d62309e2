use std::fmt;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// A half-open byte range `[start, end)` into an original buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    /// Starting byte offset (inclusive)
    pub start: usize,
    /// Ending byte offset (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// The bytes this span covers in `buf`.
    ///
    /// Callers must have validated the span against `buf` first; use
    /// [`apply_edits`] for checked application.
    pub fn slice<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.start..self.end]
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// The fundamental edit primitive: a byte-span replacement.
///
/// All high-level operations (path-matched value substitution, wholesale
/// container replacement) compile down to this single primitive.
/// Intelligence lives in span acquisition, not application.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until applied with apply_edits()"]
pub struct Edit {
    /// Region of the original buffer to replace
    pub span: Span,
    /// Bytes to insert at that region
    pub new_bytes: Vec<u8>,
}

impl Edit {
    pub fn new(span: Span, new_bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            span,
            new_bytes: new_bytes.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("invalid byte range {span} in buffer of length {buf_len}")]
    InvalidByteRange { span: Span, buf_len: usize },

    #[error("edit spans overlap: {first} and {second}")]
    OverlappingSpans { first: Span, second: Span },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Apply a set of disjoint edits to `original`, producing a new buffer.
///
/// Edits are ordered by ascending start offset and applied in one forward
/// pass: unedited regions are copied verbatim and replacement bytes are
/// spliced in at the matched spans. Because every span is expressed in
/// original-buffer offsets, multiple edits compose without drift. The
/// input buffer is never mutated.
pub fn apply_edits(original: &[u8], edits: &[Edit]) -> Result<Vec<u8>, EditError> {
    let mut ordered: Vec<&Edit> = edits.iter().collect();
    ordered.sort_by_key(|edit| (edit.span.start, edit.span.end));

    for edit in &ordered {
        if edit.span.start > edit.span.end || edit.span.end > original.len() {
            return Err(EditError::InvalidByteRange {
                span: edit.span,
                buf_len: original.len(),
            });
        }
    }
    for pair in ordered.windows(2) {
        if pair[1].span.start < pair[0].span.end {
            return Err(EditError::OverlappingSpans {
                first: pair[0].span,
                second: pair[1].span,
            });
        }
    }

    let removed: usize = ordered.iter().map(|edit| edit.span.len()).sum();
    let added: usize = ordered.iter().map(|edit| edit.new_bytes.len()).sum();
    let mut output = Vec::with_capacity(original.len() - removed + added);

    let mut cursor = 0;
    for edit in ordered {
        output.extend_from_slice(&original[cursor..edit.span.start]);
        output.extend_from_slice(&edit.new_bytes);
        cursor = edit.span.end;
    }
    output.extend_from_slice(&original[cursor..]);

    Ok(output)
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or the target file is left untouched.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    let parent = path.parent().ok_or_else(|| {
        EditError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no parent directory",
        ))
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
