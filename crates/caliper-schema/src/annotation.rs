//! Tag extraction from free-form annotation text.
//!
//! A line contributes a tag when, after optional comment decoration
//! (whitespace, `*`, `/`, `#`, `!`), it reads `@<tag>` or `@<tag> <value>`.
//! Tags are ASCII letters and hyphens. Every other line is ignored, so
//! decorative or malformed text never causes an error.

use indexmap::IndexMap;

/// The value carried by a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationValue {
    /// The tag was present without a value (`@serialize`).
    Flag,
    /// The trimmed, non-empty text after the tag.
    Text(String),
}

impl AnnotationValue {
    /// Returns the text value, or `None` for a bare flag.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnnotationValue::Flag => None,
            AnnotationValue::Text(text) => Some(text),
        }
    }
}

/// Tags found on one field, in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationMap {
    tags: IndexMap<String, AnnotationValue>,
}

impl AnnotationMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag. A repeated tag overwrites the earlier value.
    pub fn insert(&mut self, tag: impl Into<String>, value: AnnotationValue) {
        self.tags.insert(tag.into(), value);
    }

    pub fn get(&self, tag: &str) -> Option<&AnnotationValue> {
        self.tags.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    /// Text value of a tag; `None` if absent or a bare flag.
    pub fn text(&self, tag: &str) -> Option<&str> {
        self.get(tag).and_then(AnnotationValue::as_text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnnotationValue)> {
        self.tags.iter().map(|(tag, value)| (tag.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Parse a block of annotation text into an [`AnnotationMap`].
pub fn parse_annotations(text: &str) -> AnnotationMap {
    let mut map = AnnotationMap::new();
    for line in text.lines() {
        if let Some((tag, value)) = parse_line(line) {
            map.insert(tag, value);
        }
    }
    map
}

fn parse_line(line: &str) -> Option<(&str, AnnotationValue)> {
    let rest = line
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '/' | '#' | '!'));
    let rest = rest.strip_prefix('@')?;

    let tag_len = rest
        .find(|c: char| !(c.is_ascii_alphabetic() || c == '-'))
        .unwrap_or(rest.len());
    if tag_len == 0 {
        return None;
    }

    let (tag, tail) = rest.split_at(tag_len);
    if !tail.is_empty() && !tail.starts_with(char::is_whitespace) {
        return None;
    }

    // a one-line doc comment leaves its closing `*/` on the value
    let value = tail.trim().trim_end_matches("*/").trim_end();
    let value = if value.is_empty() {
        AnnotationValue::Flag
    } else {
        AnnotationValue::Text(value.to_string())
    };

    Some((tag, value))
}
