//! Front-matter parsing
//!
//! Documents may start with a metadata header:
//!
//! ```text
//! ---
//! title: Hello
//! tags: ["rust", "blog"]
//! ---
//! Body text
//! ```
//!
//! Parsing runs in two phases. The delimiter scan locates the header lines and
//! the body; the line tokenizer then turns each `key: value` line into a
//! metadata entry. A document without a header is not an error: it parses to
//! empty metadata and the whole text as body.

use indexmap::IndexMap;
use serde::Serialize;

const DELIMITER: &str = "---";
const BYTE_ORDER_MARK: char = '\u{feff}';
const QUOTES: [char; 2] = ['"', '\''];

/// A single metadata value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Text(String),
    List(Vec<String>),
}

impl MetaValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            MetaValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            MetaValue::List(items) => Some(items),
            MetaValue::Text(_) => None,
        }
    }
}

/// Parsed metadata header plus the remaining document body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrontMatter {
    /// Header entries in the order they first appear
    pub metadata: IndexMap<String, MetaValue>,
    /// Everything after the closing delimiter, unparsed
    pub body: String,
}

impl FrontMatter {
    /// Parse a raw document.
    ///
    /// Never fails; a missing or malformed header yields empty metadata and
    /// the (byte-order-mark stripped) input as body.
    pub fn parse(raw: &str) -> Self {
        let content = raw.strip_prefix(BYTE_ORDER_MARK).unwrap_or(raw);

        match split_header(content) {
            Some((lines, body)) => Self {
                metadata: tokenize(&lines),
                body: body.to_string(),
            },
            None => Self {
                metadata: IndexMap::new(),
                body: content.to_string(),
            },
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.metadata.get(key)
    }

    /// Text value for `key`; list values are not flattened
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(MetaValue::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.text("title")
    }

    pub fn date(&self) -> Option<&str> {
        self.text("date")
    }

    pub fn category(&self) -> Option<&str> {
        self.text("category")
    }

    pub fn description(&self) -> Option<&str> {
        self.text("description")
    }

    pub fn excerpt(&self) -> Option<&str> {
        self.text("excerpt")
    }

    /// Tags, only when the header declared them as an array
    pub fn tags(&self) -> Option<&[String]> {
        self.get("tags").and_then(MetaValue::as_list)
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }
}

/// Split off the next newline-terminated line, dropping a trailing `\r`.
///
/// Returns `None` when no line terminator remains.
fn take_line(s: &str) -> Option<(&str, &str)> {
    let end = s.find('\n')?;
    let line = &s[..end];
    let line = line.strip_suffix('\r').unwrap_or(line);
    Some((line, &s[end + 1..]))
}

/// Phase one: locate the header lines and the body.
///
/// The header is an opening `---` line, at least one metadata line and a
/// closing `---` line, each terminated by `\n` or `\r\n`. The first closing
/// delimiter after the first metadata line wins.
fn split_header(content: &str) -> Option<(Vec<&str>, &str)> {
    let (opening, mut rest) = take_line(content)?;
    if opening != DELIMITER {
        return None;
    }

    let mut lines = Vec::new();
    loop {
        let (line, after) = take_line(rest)?;
        if line == DELIMITER && !lines.is_empty() {
            return Some((lines, after));
        }
        lines.push(line);
        rest = after;
    }
}

/// Phase two: turn header lines into metadata entries.
fn tokenize(lines: &[&str]) -> IndexMap<String, MetaValue> {
    let mut metadata = IndexMap::new();

    for line in lines {
        let Some((key, value)) = split_entry(line) else {
            tracing::trace!("Skipping front-matter line without key: {:?}", line);
            continue;
        };

        let value = strip_quotes(value);
        let value = if key == "tags" && value.starts_with('[') && value.ends_with(']') {
            MetaValue::List(parse_tags(value))
        } else {
            MetaValue::Text(value.to_string())
        };

        metadata.insert(key.to_string(), value);
    }

    metadata
}

/// Split a line at its first colon. A colon at position 0 means no key.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    match line.find(':') {
        Some(0) | None => None,
        Some(colon) => Some((line[..colon].trim(), line[colon + 1..].trim())),
    }
}

/// Remove exactly one pair of matching surrounding quotes.
/// A lone quote character counts as an empty quoted value.
fn strip_quotes(value: &str) -> &str {
    for quote in QUOTES {
        if value.starts_with(quote) && value.ends_with(quote) {
            return value.get(1..value.len().saturating_sub(1)).unwrap_or("");
        }
    }
    value
}

/// Parse a bracketed tag list, strictly as a JSON array first.
fn parse_tags(value: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<serde_json::Value>>(value) {
        Ok(items) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        Err(e) => {
            tracing::debug!("Tag list is not a JSON array ({}), splitting on commas", e);
            parse_tags_lenient(value)
        }
    }
}

/// Permissive tag list parsing for malformed arrays.
///
/// Drops the outer brackets, splits on commas, trims every element and strips
/// one leading and one trailing quote from each. Never fails.
pub fn parse_tags_lenient(value: &str) -> Vec<String> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(value);

    inner
        .split(',')
        .map(|tag| {
            let tag = tag.trim();
            let tag = tag.strip_prefix(QUOTES).unwrap_or(tag);
            let tag = tag.strip_suffix(QUOTES).unwrap_or(tag);
            tag.to_string()
        })
        .collect()
}
