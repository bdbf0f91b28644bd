//! Line classification for the block scanner.

use crate::model::is_table_row;

/// Structural class of a single input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Empty or whitespace-only
    Blank,
    /// `#`-marked heading
    Heading { level: u8, text: String },
    /// Triple-backtick fence marker with optional language tag
    Fence { language: Option<String> },
    /// Bullet or numbered list item
    ListItem {
        ordered: bool,
        depth: u8,
        text: String,
    },
    /// Delimiter-bounded table row
    TableRow,
    /// Anything else
    Text { indented: bool, text: String },
}

/// A recognized list marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker<'a> {
    /// Numbered (`1.`, `2)`) rather than bulleted
    pub ordered: bool,
    /// Leading whitespace width in columns
    pub indent: usize,
    /// Item text after the marker
    pub text: &'a str,
}

/// Classify a line. `indent_unit` is the whitespace width of one nesting level.
pub fn classify(line: &str, indent_unit: usize) -> LineKind {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if let Some(language) = parse_fence(line) {
        return LineKind::Fence { language };
    }
    if let Some((level, text)) = parse_heading(line) {
        return LineKind::Heading { level, text };
    }
    if is_table_row(line) {
        return LineKind::TableRow;
    }
    if let Some(marker) = parse_list_marker(line) {
        let depth = (marker.indent / indent_unit.max(1)).min(u8::MAX as usize) as u8;
        return LineKind::ListItem {
            ordered: marker.ordered,
            depth,
            text: marker.text.to_string(),
        };
    }
    LineKind::Text {
        indented: leading_columns(line) > 0,
        text: line.trim().to_string(),
    }
}

/// Width of leading whitespace in columns (tab = 4).
pub fn leading_columns(line: &str) -> usize {
    let mut cols = 0;
    for ch in line.chars() {
        match ch {
            ' ' => cols += 1,
            '\t' => cols += 4,
            _ => break,
        }
    }
    cols
}

/// Parse a heading line into `(level, text)`.
///
/// Up to three leading spaces are allowed, then 1-6 `#` and whitespace.
/// A closing `#` run separated by whitespace is removed.
pub fn parse_heading(line: &str) -> Option<(u8, String)> {
    if leading_columns(line) > 3 {
        return None;
    }
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &trimmed[hashes..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let text = rest.trim();
    let without_closing = text.trim_end_matches('#');
    let text = if without_closing.is_empty() || without_closing.ends_with(char::is_whitespace) {
        without_closing.trim_end()
    } else {
        text
    };
    Some((hashes as u8, text.to_string()))
}

/// Parse a fence marker line. Returns the language tag (if any).
pub fn parse_fence(line: &str) -> Option<Option<String>> {
    let trimmed = line.trim();
    if !trimmed.starts_with("```") {
        return None;
    }
    let info = trimmed.trim_start_matches('`').trim();
    let language = info
        .split_whitespace()
        .next()
        .map(|l| l.trim_matches(|c| c == '{' || c == '}' || c == '.'))
        .filter(|l| !l.is_empty())
        .map(str::to_string);
    Some(language)
}

/// Parse a list marker (`-`, `*`, `+`, `1.` or `1)` followed by whitespace).
pub fn parse_list_marker(line: &str) -> Option<ListMarker<'_>> {
    let indent = leading_columns(line);
    let body = line.trim_start();

    let (ordered, marker_len) = match body.chars().next()? {
        '-' | '*' | '+' => (false, 1),
        c if c.is_ascii_digit() => {
            let digits = body.chars().take_while(|c| c.is_ascii_digit()).count();
            if digits > 9 {
                return None;
            }
            match body[digits..].chars().next() {
                Some('.') | Some(')') => (true, digits + 1),
                _ => return None,
            }
        }
        _ => return None,
    };

    let rest = &body[marker_len..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(ListMarker {
        ordered,
        indent,
        text: rest.trim(),
    })
}
