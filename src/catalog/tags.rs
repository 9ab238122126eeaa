// catalog/tags.rs - Lenient parser for the serialized tag mapping
//
// The catalog stores each game's tags as one string shaped like a
// Python dict literal: `{'Indie': 1204, 'Action': 988, "Rock 'n' Roll": 3}`.
// This module is the only place that reads that string. Any malformed
// input yields `None`, which callers treat as "this game has no tags".

use bson::{Bson, Document};

/// How many tags the detail view summarizes.
pub const TOP_TAG_COUNT: usize = 5;

/// Maximum number of tag names offered by `matching_tags`.
pub const TAG_DISPLAY_LIMIT: usize = 1000;

/// Parsed tag mapping, in the order the entries were serialized.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagMap {
    entries: Vec<(String, i64)>,
}

impl TagMap {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn weight(&self, name: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, weight)| *weight)
    }

    /// The `n` heaviest tags; equal weights keep their serialized order.
    pub fn top(&self, n: usize) -> Vec<&str> {
        let mut ranked: Vec<&(String, i64)> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(n)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Parse a serialized tag mapping. Returns `None` on any syntax error.
pub fn parse_tag_map(raw: &str) -> Option<TagMap> {
    let mut parser = Parser {
        chars: raw.trim().chars().collect(),
        pos: 0,
    };
    let map = parser.map()?;
    parser.skip_whitespace();
    if parser.pos != parser.chars.len() {
        return None;
    }
    Some(map)
}

/// Tag mapping of a raw document, `None` when absent or malformed.
pub fn document_tags(doc: &Document) -> Option<TagMap> {
    match doc.get("tags") {
        Some(Bson::String(raw)) => {
            let parsed = parse_tag_map(raw);
            if parsed.is_none() && !raw.trim().is_empty() {
                tracing::warn!(
                    "Ignoring unparseable tags on {:?}",
                    doc.get("name").and_then(Bson::as_str).unwrap_or("<unnamed>")
                );
            }
            parsed
        }
        _ => None,
    }
}

/// Tag names of a raw document; empty when the mapping cannot be read.
pub fn tag_names(doc: &Document) -> Vec<String> {
    document_tags(doc)
        .map(|tags| tags.names().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Top tags joined with ", ", or `None` if there is nothing to show.
pub fn summarize_top_tags(doc: &Document) -> Option<String> {
    let tags = document_tags(doc)?;
    if tags.is_empty() {
        return None;
    }
    Some(tags.top(TOP_TAG_COUNT).join(", "))
}

/// Case-insensitive substring filter over a sorted tag list, capped at
/// `TAG_DISPLAY_LIMIT` entries. An empty search keeps everything.
pub fn matching_tags<'a>(all_tags: &'a [String], search: &str) -> Vec<&'a str> {
    let needle = search.trim().to_lowercase();
    all_tags
        .iter()
        .filter(|tag| needle.is_empty() || tag.to_lowercase().contains(&needle))
        .take(TAG_DISPLAY_LIMIT)
        .map(String::as_str)
        .collect()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn expect(&mut self, expected: char) -> Option<()> {
        (self.bump()? == expected).then_some(())
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn map(&mut self) -> Option<TagMap> {
        self.skip_whitespace();
        self.expect('{')?;
        let mut entries = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.pos += 1;
            return Some(TagMap { entries });
        }

        loop {
            self.skip_whitespace();
            let name = self.quoted()?;
            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();
            let weight = self.integer()?;
            entries.push((name, weight));

            self.skip_whitespace();
            match self.bump()? {
                ',' => {
                    // Trailing comma before the closing brace
                    self.skip_whitespace();
                    if self.peek() == Some('}') {
                        self.pos += 1;
                        break;
                    }
                }
                '}' => break,
                _ => return None,
            }
        }

        Some(TagMap { entries })
    }

    fn quoted(&mut self) -> Option<String> {
        let quote = self.bump()?;
        if quote != '\'' && quote != '"' {
            return None;
        }
        let mut value = String::new();
        loop {
            match self.bump()? {
                '\\' => value.push(self.bump()?),
                c if c == quote => return Some(value),
                c => value.push(c),
            }
        }
    }

    fn integer(&mut self) -> Option<i64> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits.parse().ok()
    }
}
