use crate::patch::PatchError;
use std::fmt;

/// One step of a concrete key-path, as produced by a format scanner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathPart {
    /// An object member key
    Key(String),
    /// An array element index
    Index(usize),
}

impl fmt::Display for PathPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPart::Key(key) => write!(f, "{key}"),
            PathPart::Index(index) => write!(f, "{index}"),
        }
    }
}

/// One segment of a selector pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches an object key with exactly this name
    Literal(String),
    /// Matches the array element at this index, or an object key spelled
    /// the same way
    Index(usize),
    /// Matches any single segment at this depth, key or index
    Wildcard,
}

/// A parsed key-path pattern, e.g. `Defaults.GameMode`, `Mods.*` or
/// `Servers.0.Port`.
///
/// Segments are separated by `.`; a quoted segment (`Mods."a.b"`) is
/// always a Literal, so quoting escapes both the separator and the
/// special meaning of `*` and all-digit segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    raw: String,
    segments: Vec<Segment>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, PatchError> {
        let segments = parse_segments(input)?;
        if segments.is_empty() {
            return Err(invalid(input, "empty selector"));
        }
        Ok(Self {
            raw: input.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Positional comparison against a concrete key-path: segment counts
    /// must be identical and every segment must match its counterpart.
    pub fn matches(&self, path: &[PathPart]) -> bool {
        self.segments.len() == path.len()
            && self
                .segments
                .iter()
                .zip(path)
                .all(|(segment, part)| segment_matches(segment, part))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

fn segment_matches(segment: &Segment, part: &PathPart) -> bool {
    match (segment, part) {
        (Segment::Wildcard, _) => true,
        (Segment::Literal(name), PathPart::Key(key)) => name == key,
        (Segment::Literal(_), PathPart::Index(_)) => false,
        (Segment::Index(n), PathPart::Index(i)) => n == i,
        // Flat formats spell numeric keys as text; let `Servers.0` reach
        // an object key "0" as well as array element 0.
        (Segment::Index(n), PathPart::Key(key)) => *key == n.to_string(),
    }
}

fn invalid(input: &str, message: &str) -> PatchError {
    PatchError::InvalidSelector {
        input: input.to_string(),
        message: message.to_string(),
    }
}

fn parse_segments(input: &str) -> Result<Vec<Segment>, PatchError> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut current_quoted = false;
    let mut chars = input.chars();
    let mut in_quotes = false;
    let mut quote_char = '\0';

    fn push(text: &mut String, quoted: &mut bool, out: &mut Vec<Segment>) {
        let segment = tag_segment(text, *quoted);
        out.push(segment);
        text.clear();
        *quoted = false;
    }

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == quote_char {
                in_quotes = false;
                continue;
            }

            if quote_char == '"' && ch == '\\' {
                if let Some(next) = chars.next() {
                    let escaped = match next {
                        '"' => '"',
                        '\\' => '\\',
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    };
                    current.push(escaped);
                    continue;
                }
            }

            current.push(ch);
            continue;
        }

        match ch {
            '.' => {
                if current.is_empty() && !current_quoted {
                    return Err(invalid(input, "empty path segment"));
                }
                push(&mut current, &mut current_quoted, &mut segments);
            }
            '"' | '\'' => {
                if !current.is_empty() {
                    return Err(invalid(input, "unexpected quote inside segment"));
                }
                in_quotes = true;
                quote_char = ch;
                current_quoted = true;
            }
            ch if ch.is_whitespace() => {
                return Err(invalid(input, "whitespace not allowed in selector"));
            }
            other => current.push(other),
        }
    }

    if in_quotes {
        return Err(invalid(input, "unterminated quoted segment"));
    }

    if !current.is_empty() || current_quoted {
        push(&mut current, &mut current_quoted, &mut segments);
    }

    Ok(segments)
}

fn tag_segment(text: &str, quoted: bool) -> Segment {
    if quoted {
        return Segment::Literal(text.to_string());
    }
    if text == "*" {
        return Segment::Wildcard;
    }
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(index) = text.parse::<usize>() {
            return Segment::Index(index);
        }
    }
    Segment::Literal(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> PathPart {
        PathPart::Key(name.to_string())
    }

    #[test]
    fn test_parse_exact_path() {
        let selector = Selector::parse("Defaults.GameMode").unwrap();
        assert_eq!(
            selector.segments(),
            &[
                Segment::Literal("Defaults".to_string()),
                Segment::Literal("GameMode".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_wildcard_and_index() {
        let selector = Selector::parse("Servers.0.Mods.*").unwrap();
        assert_eq!(
            selector.segments(),
            &[
                Segment::Literal("Servers".to_string()),
                Segment::Index(0),
                Segment::Literal("Mods".to_string()),
                Segment::Wildcard,
            ]
        );
    }

    #[test]
    fn test_quoted_segment_is_always_literal() {
        let selector = Selector::parse("Mods.\"a.b\".\"*\".\"7\"").unwrap();
        assert_eq!(
            selector.segments(),
            &[
                Segment::Literal("Mods".to_string()),
                Segment::Literal("a.b".to_string()),
                Segment::Literal("*".to_string()),
                Segment::Literal("7".to_string()),
            ]
        );
    }

    #[test]
    fn test_exact_match_requires_equal_length() {
        let selector = Selector::parse("Defaults.GameMode").unwrap();
        assert!(selector.matches(&[key("Defaults"), key("GameMode")]));
        assert!(!selector.matches(&[key("Defaults")]));
        assert!(!selector.matches(&[key("Defaults"), key("GameMode"), key("X")]));
        assert!(!selector.matches(&[key("Defaults"), key("World")]));
    }

    #[test]
    fn test_wildcard_matches_any_single_segment() {
        let selector = Selector::parse("Mods.*").unwrap();
        assert!(selector.matches(&[key("Mods"), key("anything")]));
        assert!(selector.matches(&[key("Mods"), PathPart::Index(3)]));
        assert!(!selector.matches(&[key("Mods")]));
        assert!(!selector.matches(&[key("Other"), key("anything")]));
    }

    #[test]
    fn test_index_segment_matches_numeric_key_too() {
        let selector = Selector::parse("Servers.0").unwrap();
        assert!(selector.matches(&[key("Servers"), PathPart::Index(0)]));
        assert!(selector.matches(&[key("Servers"), key("0")]));
        assert!(!selector.matches(&[key("Servers"), key("00")]));
        assert!(!selector.matches(&[key("Servers"), PathPart::Index(1)]));
    }

    #[test]
    fn test_literal_never_matches_index() {
        let selector = Selector::parse("Servers.first").unwrap();
        assert!(!selector.matches(&[key("Servers"), PathPart::Index(0)]));
    }

    #[test]
    fn test_rejects_malformed_selectors() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("a..b").is_err());
        assert!(Selector::parse("a b").is_err());
        assert!(Selector::parse("a.\"unterminated").is_err());
    }
}
