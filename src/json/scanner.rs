//! Positional JSON tokenizer.
//!
//! A single left-to-right pass over the raw byte buffer, producing one
//! (key-path, value-span) observation per value without building a tree.
//! This is what makes structure preservation possible: nothing is ever
//! re-serialized, so comments, key order, whitespace and number/string
//! formatting cannot be lost. The scanner also tolerates `//` and
//! `/* */` comments, which strict JSON lacks but real server configs
//! use; comments are trivia, identical to whitespace for path
//! bookkeeping.

use crate::edit::Span;
use crate::patch::{PatchError, ValueObservation};
use crate::selector::PathPart;
use crate::value::is_json_number;

/// Scan `input` as a JSON document, returning the observation list.
///
/// Fails with [`PatchError::MalformedInput`] carrying the byte offset of
/// the failure on unterminated strings, unbalanced delimiters, invalid
/// literals, or trailing content after the top-level value.
pub fn scan(input: &[u8]) -> Result<Vec<ValueObservation>, PatchError> {
    let mut scanner = Scanner {
        buf: input,
        pos: 0,
        path: Vec::new(),
        out: Vec::new(),
    };

    scanner.skip_trivia()?;
    scanner.value()?;
    scanner.skip_trivia()?;
    if scanner.pos != input.len() {
        return Err(malformed(scanner.pos, "trailing content after top-level value"));
    }

    Ok(scanner.out)
}

fn malformed(offset: usize, message: &str) -> PatchError {
    PatchError::MalformedInput {
        offset,
        message: message.to_string(),
    }
}

struct Scanner<'a> {
    buf: &'a [u8],
    pos: usize,
    /// Current key-path: object keys and array indices of every
    /// container enclosing the cursor
    path: Vec<PathPart>,
    out: Vec<ValueObservation>,
}

impl Scanner<'_> {
    fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    fn record(&mut self, span: Span) {
        self.out.push(ValueObservation {
            path: self.path.clone(),
            span,
            prefix: Vec::new(),
        });
    }

    fn skip_trivia(&mut self) -> Result<(), PatchError> {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\n') => self.pos += 1,
                Some(b'/') => self.comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn comment(&mut self) -> Result<(), PatchError> {
        let start = self.pos;
        match self.buf.get(self.pos + 1) {
            Some(b'/') => {
                self.pos += 2;
                while let Some(b) = self.peek() {
                    if b == b'\n' {
                        break;
                    }
                    self.pos += 1;
                }
                Ok(())
            }
            Some(b'*') => {
                self.pos += 2;
                while self.pos + 1 < self.buf.len() {
                    if self.buf[self.pos] == b'*' && self.buf[self.pos + 1] == b'/' {
                        self.pos += 2;
                        return Ok(());
                    }
                    self.pos += 1;
                }
                Err(malformed(start, "unterminated block comment"))
            }
            _ => Err(malformed(start, "unexpected character '/'")),
        }
    }

    /// Scan one value of any shape and return its span. Containers are
    /// covered whole, from opening to matching closing delimiter, so a
    /// selector can target a sub-object for wholesale replacement.
    fn value(&mut self) -> Result<Span, PatchError> {
        match self.peek() {
            Some(b'{') => self.object(),
            Some(b'[') => self.array(),
            Some(b'"') => self.string(),
            Some(_) => self.bare_literal(),
            None => Err(malformed(self.pos, "expected a value")),
        }
    }

    fn object(&mut self) -> Result<Span, PatchError> {
        let start = self.pos;
        self.pos += 1; // '{'
        self.skip_trivia()?;
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(Span::new(start, self.pos));
        }

        loop {
            if self.peek() != Some(b'"') {
                return Err(malformed(self.pos, "expected object key"));
            }
            let key = self.key()?;
            self.skip_trivia()?;
            if self.peek() != Some(b':') {
                return Err(malformed(self.pos, "expected ':' after object key"));
            }
            self.pos += 1;
            self.skip_trivia()?;

            self.path.push(PathPart::Key(key));
            let span = self.value()?;
            self.record(span);
            self.path.pop();

            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_trivia()?;
                }
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Span::new(start, self.pos));
                }
                _ => return Err(malformed(self.pos, "expected ',' or '}' in object")),
            }
        }
    }

    fn array(&mut self) -> Result<Span, PatchError> {
        let start = self.pos;
        self.pos += 1; // '['
        self.skip_trivia()?;
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(Span::new(start, self.pos));
        }

        let mut index = 0;
        loop {
            self.path.push(PathPart::Index(index));
            let span = self.value()?;
            self.record(span);
            self.path.pop();

            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_trivia()?;
                    index += 1;
                }
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Span::new(start, self.pos));
                }
                _ => return Err(malformed(self.pos, "expected ',' or ']' in array")),
            }
        }
    }

    /// Span of a quoted string, both quotes included. Escape sequences
    /// are honored so an escaped `\"` never terminates the scan early.
    fn string(&mut self) -> Result<Span, PatchError> {
        let start = self.pos;
        self.pos += 1; // opening '"'
        loop {
            match self.peek() {
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(Span::new(start, self.pos));
                }
                Some(b'\\') => {
                    if self.pos + 1 >= self.buf.len() {
                        return Err(malformed(start, "unterminated string"));
                    }
                    self.pos += 2;
                }
                Some(_) => self.pos += 1,
                None => return Err(malformed(start, "unterminated string")),
            }
        }
    }

    /// Read an object key, returning its unescaped text for the path
    /// stack.
    fn key(&mut self) -> Result<String, PatchError> {
        let span = self.string()?;
        let raw = &self.buf[span.start + 1..span.end - 1];
        unescape(raw, span.start + 1)
    }

    /// A bare token: number, `true`, `false` or `null`, delimited by a
    /// comma, closing bracket/brace, whitespace or comment.
    fn bare_literal(&mut self) -> Result<Span, PatchError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b',' | b'}' | b']' | b' ' | b'\t' | b'\r' | b'\n' | b'/') {
                break;
            }
            self.pos += 1;
        }

        let token = &self.buf[start..self.pos];
        if token.is_empty() {
            return Err(malformed(start, "expected a value"));
        }
        if token == b"true" || token == b"false" || token == b"null" || is_json_number(token) {
            Ok(Span::new(start, self.pos))
        } else {
            Err(malformed(start, "invalid literal"))
        }
    }
}

fn unescape(raw: &[u8], offset: usize) -> Result<String, PatchError> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| malformed(offset + e.valid_up_to(), "invalid UTF-8 in string"))?;
    if !text.contains('\\') {
        return Ok(text.to_string());
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices();
    while let Some((i, ch)) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some((_, '"')) => out.push('"'),
            Some((_, '\\')) => out.push('\\'),
            Some((_, '/')) => out.push('/'),
            Some((_, 'b')) => out.push('\u{0008}'),
            Some((_, 'f')) => out.push('\u{000C}'),
            Some((_, 'n')) => out.push('\n'),
            Some((_, 'r')) => out.push('\r'),
            Some((_, 't')) => out.push('\t'),
            Some((_, 'u')) => {
                let hex: String = chars.by_ref().take(4).map(|(_, c)| c).collect();
                if hex.len() != 4 {
                    return Err(malformed(offset + i, "truncated \\u escape"));
                }
                let code = u32::from_str_radix(&hex, 16)
                    .map_err(|_| malformed(offset + i, "invalid \\u escape"))?;
                // Unpaired surrogates collapse to U+FFFD; key identity
                // only needs to be stable, not round-trippable.
                out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            }
            Some((_, _)) => return Err(malformed(offset + i, "invalid escape sequence")),
            None => return Err(malformed(offset + i, "truncated escape")),
        }
    }

    Ok(out)
}
