//! Positional scanner for java-properties style files.
//!
//! Line-oriented: `#`/`!` comment lines and blank lines are trivia,
//! entries are `key = value`, `key: value` or `key value`, and a value
//! line ending in an unescaped backslash continues on the next line.
//! Keys split on `.` into path segments so the same dotted selectors
//! address both formats. The recorded value span covers the whole
//! logical value region, continuation newlines included. A key alone on
//! its line is a legal entry with an empty value; its observation asks
//! for a `=` ahead of any substituted value.

use crate::edit::Span;
use crate::patch::{PatchError, ValueObservation};
use crate::selector::PathPart;

/// Scan `input` as a properties file, returning the observation list.
pub fn scan(input: &[u8]) -> Result<Vec<ValueObservation>, PatchError> {
    let mut out = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        let (content_end, mut next) = line_bounds(input, pos);

        let mut i = pos;
        while i < content_end && is_blank(input[i]) {
            i += 1;
        }
        if i == content_end || input[i] == b'#' || input[i] == b'!' {
            pos = next;
            continue;
        }

        // Key runs to the first separator; backslash escapes a byte.
        let key_start = i;
        let mut key = Vec::new();
        while i < content_end {
            match input[i] {
                b'\\' if i + 1 < content_end => {
                    key.push(input[i + 1]);
                    i += 2;
                }
                b'=' | b':' | b' ' | b'\t' => break,
                b => {
                    key.push(b);
                    i += 1;
                }
            }
        }

        // At most one '=' or ':' separator, surrounded by blanks.
        let key_end = i;
        while i < content_end && is_blank(input[i]) {
            i += 1;
        }
        if i < content_end && (input[i] == b'=' || input[i] == b':') {
            i += 1;
            while i < content_end && is_blank(input[i]) {
                i += 1;
            }
        }

        // A line that is only a key legally means an empty value. The
        // empty span sits flush against the key, so a substituted value
        // must bring its own separator.
        let prefix = if i == key_end {
            b"=".to_vec()
        } else {
            Vec::new()
        };

        let value_start = i;
        let mut value_end = content_end;
        while has_continuation(&input[value_start..value_end]) && next < input.len() {
            let (cont_end, cont_next) = line_bounds(input, next);
            value_end = cont_end;
            next = cont_next;
        }

        let key = String::from_utf8(key).map_err(|_| PatchError::MalformedInput {
            offset: key_start,
            message: "invalid UTF-8 in property key".to_string(),
        })?;
        let path = key
            .split('.')
            .map(|segment| PathPart::Key(segment.to_string()))
            .collect();

        out.push(ValueObservation {
            path,
            span: Span::new(value_start, value_end),
            prefix,
        });
        pos = next;
    }

    Ok(out)
}

fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// `(content_end, next_line_start)` for the physical line at `pos`;
/// `content_end` excludes the line terminator, `\r\n` included.
fn line_bounds(input: &[u8], pos: usize) -> (usize, usize) {
    let mut i = pos;
    while i < input.len() && input[i] != b'\n' {
        i += 1;
    }
    let next = if i < input.len() { i + 1 } else { i };
    let mut end = i;
    if end > pos && input[end - 1] == b'\r' {
        end -= 1;
    }
    (end, next)
}

/// An odd number of trailing backslashes marks a continuation line.
fn has_continuation(bytes: &[u8]) -> bool {
    let trailing = bytes.iter().rev().take_while(|&&b| b == b'\\').count();
    trailing % 2 == 1
}
