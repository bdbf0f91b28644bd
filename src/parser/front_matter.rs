//! Leading metadata block extraction.

use super::line::{parse_fence, parse_heading};
use crate::model::{Diagnostic, DiagnosticKind, MetaValue, Metadata};
use once_cell::sync::Lazy;
use regex::Regex;

static TAGS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*tags\s*:\s*\[(.*)\]\s*$").unwrap());

/// Result of front matter extraction.
#[derive(Debug, Clone, Default)]
pub struct FrontMatter<'a> {
    /// Declared (or heuristically derived) metadata
    pub meta: Metadata,

    /// Text after the metadata block
    pub body: &'a str,

    /// Index of the first body line in the original text
    pub body_line_offset: usize,

    /// Whether a well-formed metadata block was found
    pub declared: bool,

    /// Set when a metadata block was present but could not be parsed
    pub diagnostic: Option<Diagnostic>,
}

/// Split a leading `---` delimited YAML block off `text`.
///
/// Never fails. A block that does not parse as a mapping yields empty
/// metadata and leaves the text unchanged. Without a block, `title` and
/// `tags` are derived from the body.
pub fn extract(text: &str) -> FrontMatter<'_> {
    match split_block(text) {
        Some((interior, body, offset)) => match parse_mapping(interior) {
            Ok(meta) => FrontMatter {
                meta,
                body,
                body_line_offset: offset,
                declared: true,
                diagnostic: None,
            },
            Err(message) => {
                log::warn!("Ignoring malformed front matter: {}", message);
                FrontMatter {
                    meta: Metadata::new(),
                    body: text,
                    body_line_offset: 0,
                    declared: false,
                    diagnostic: Some(Diagnostic::new(
                        DiagnosticKind::MalformedFrontMatter,
                        0,
                        message,
                    )),
                }
            }
        },
        None => FrontMatter {
            meta: heuristic_metadata(text),
            body: text,
            body_line_offset: 0,
            declared: false,
            diagnostic: None,
        },
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Returns `(interior, body, body_line_offset)`.
fn split_block(text: &str) -> Option<(&str, &str, usize)> {
    let first_end = text.find('\n')?;
    if !is_delimiter(&text[..first_end]) {
        return None;
    }

    let interior_start = first_end + 1;
    let mut pos = interior_start;
    let mut line_no = 1;
    while pos <= text.len() {
        let end = text[pos..].find('\n').map(|i| pos + i).unwrap_or(text.len());
        if is_delimiter(&text[pos..end]) {
            let body_start = (end + 1).min(text.len());
            return Some((&text[interior_start..pos], &text[body_start..], line_no + 1));
        }
        if end == text.len() {
            break;
        }
        pos = end + 1;
        line_no += 1;
    }
    None
}

fn parse_mapping(interior: &str) -> Result<Metadata, String> {
    if interior.trim().is_empty() {
        return Ok(Metadata::new());
    }
    let value: serde_yaml::Value =
        serde_yaml::from_str(interior).map_err(|e| format!("invalid YAML: {}", e))?;
    match value {
        serde_yaml::Value::Mapping(map) => {
            let mut meta = Metadata::new();
            for (key, value) in map {
                let key = match key {
                    serde_yaml::Value::String(s) => s,
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported key: {:?}", other)),
                };
                meta.insert(key, MetaValue::from_yaml(value));
            }
            Ok(meta)
        }
        serde_yaml::Value::Null => Ok(Metadata::new()),
        _ => Err("front matter is not a key/value mapping".to_string()),
    }
}

/// Derive `title` (first level-1 heading) and `tags` from the body.
fn heuristic_metadata(text: &str) -> Metadata {
    let mut meta = Metadata::new();
    let mut in_fence = false;

    for line in text.lines() {
        if parse_fence(line).is_some() {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if !meta.contains_key("title") {
            if let Some((1, title)) = parse_heading(line) {
                if !title.is_empty() {
                    meta.insert("title", MetaValue::String(title));
                }
            }
        }
        if !meta.contains_key("tags") {
            if let Some(caps) = TAGS_RE.captures(line) {
                let tags: Vec<MetaValue> = caps[1]
                    .split(',')
                    .map(|t| t.trim().trim_matches(|c| c == '"' || c == '\''))
                    .filter(|t| !t.is_empty())
                    .map(MetaValue::from)
                    .collect();
                meta.insert("tags", MetaValue::List(tags));
            }
        }
        if meta.contains_key("title") && meta.contains_key("tags") {
            break;
        }
    }

    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_front_matter() {
        let text = "---\ntitle: Guide\nauthor: Ann\ntags: [a, b]\n---\n# Body\n";
        let fm = extract(text);
        assert!(fm.declared);
        assert!(fm.diagnostic.is_none());
        assert_eq!(fm.meta.len(), 3);
        assert_eq!(fm.meta.title(), "Guide");
        assert_eq!(fm.meta.get_str("author"), Some("Ann"));
        assert_eq!(fm.meta.tags(), vec!["a", "b"]);
        assert_eq!(fm.body, "# Body\n");
        assert_eq!(fm.body_line_offset, 5);
    }

    #[test]
    fn test_title_not_invented_when_declared() {
        let fm = extract("---\nauthor: Ann\n---\n# Heading\n");
        assert_eq!(fm.meta.len(), 1);
        assert!(!fm.meta.contains_key("title"));
    }

    #[test]
    fn test_malformed_front_matter_keeps_text() {
        let text = "---\ntitle: [unclosed\n---\nBody\n";
        let fm = extract(text);
        assert!(fm.meta.is_empty());
        assert_eq!(fm.body, text);
        assert_eq!(fm.body_line_offset, 0);
        assert_eq!(
            fm.diagnostic.map(|d| d.kind),
            Some(DiagnosticKind::MalformedFrontMatter)
        );
    }

    #[test]
    fn test_non_mapping_front_matter_is_malformed() {
        let fm = extract("---\n- one\n- two\n---\nBody");
        assert!(fm.meta.is_empty());
        assert!(fm.diagnostic.is_some());
    }

    #[test]
    fn test_missing_closing_fence_means_no_front_matter() {
        let text = "---\ntitle: Open\n# Real Title\n";
        let fm = extract(text);
        assert!(!fm.declared);
        assert_eq!(fm.body, text);
        assert_eq!(fm.meta.title(), "Real Title");
    }

    #[test]
    fn test_empty_front_matter() {
        let fm = extract("---\n---\nBody");
        assert!(fm.declared);
        assert!(fm.meta.is_empty());
        assert_eq!(fm.body, "Body");
        assert_eq!(fm.body_line_offset, 2);
    }

    #[test]
    fn test_closing_fence_at_end_of_input() {
        let fm = extract("---\ntitle: T\n---");
        assert!(fm.declared);
        assert_eq!(fm.body, "");
    }

    #[test]
    fn test_heuristic_title_and_tags() {
        let text = "```\n# not this\n```\n## Sub\n# Real\ntags: [x, \"y\"]\n";
        let fm = extract(text);
        assert_eq!(fm.meta.title(), "Real");
        assert_eq!(fm.meta.tags(), vec!["x", "y"]);
    }
}
