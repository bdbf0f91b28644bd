//! Keyword heuristics for telling diagram source apart from prose.
//!
//! Classification is best-effort: the keyword lists below cover the common
//! Mermaid, PlantUML and Graphviz grammars and are not exhaustive.

use super::line::LineKind;
use once_cell::sync::Lazy;
use regex::Regex;

/// Fence language tags that always denote a diagram.
pub const DIAGRAM_LANGUAGES: &[&str] = &["mermaid", "plantuml", "puml", "graphviz", "dot", "d2"];

/// Keywords that open a diagram when followed by whitespace or end of line.
const START_KEYWORDS: &[&str] = &[
    "sequenceDiagram",
    "classDiagram",
    "stateDiagram",
    "stateDiagram-v2",
    "erDiagram",
    "gitGraph",
    "requirementDiagram",
    "quadrantChart",
    "xychart-beta",
    "@startuml",
    "@startmindmap",
    "digraph",
    "strict digraph",
];

/// Keywords that open a diagram only when they stand alone on the line.
const STANDALONE_KEYWORDS: &[&str] = &["gantt", "journey", "mindmap", "timeline", "pie"];

/// Label phrases that may introduce a diagram.
const LABEL_PHRASES: &[&str] = &[
    "Mermaid Chart",
    "Mermaid",
    "Diagram",
    "Flowchart",
    "架构图",
    "流程图",
    "关系图",
    "状态图",
    "时序图",
    "类图",
    "甘特图",
    "饼图",
];

/// First words that keep a prose diagram open.
const BODY_KEYWORDS: &[&str] = &[
    "participant",
    "actor",
    "note",
    "loop",
    "alt",
    "else",
    "opt",
    "par",
    "and",
    "end",
    "rect",
    "critical",
    "break",
    "activate",
    "deactivate",
    "autonumber",
    "state",
    "class",
    "subgraph",
    "direction",
    "style",
    "classdef",
    "linkstyle",
    "click",
    "section",
    "title",
    "dateformat",
    "axisformat",
    "@enduml",
    "node",
    "edge",
    "%%",
];

/// Connector tokens that keep a prose diagram open.
const CONNECTORS: &[&str] = &[
    "-->", "->", "==>", "-.->", "---", "--", "<|--", "..>", "||--", "}|", "|o", "<--", "::",
];

static FLOW_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(graph|flowchart)\s+(TD|TB|BT|RL|LR)\b").unwrap());

static PIE_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^pie(\s+(title|showData)\b.*)?$").unwrap());

static SECTION_LABEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(\.\d+)+\.?\s+\S").unwrap());

static SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w\s*(\[[^\]]*\]|\(\([^)]*\)\)|\{[^}]*\}|>[^\]]*\])").unwrap());

/// Check if a fence language tag denotes a diagram.
pub fn is_diagram_language(language: &str) -> bool {
    let lower = language.to_ascii_lowercase();
    DIAGRAM_LANGUAGES.contains(&lower.as_str())
}

/// Decide whether fenced content is a diagram.
///
/// Tagged fences are diagrams only for a diagram language. Untagged fences
/// are diagrams when their first non-blank line opens a diagram grammar.
pub fn is_diagram_fence(language: Option<&str>, content: &str) -> bool {
    match language {
        Some(lang) => is_diagram_language(lang),
        None => content
            .lines()
            .find(|l| !l.trim().is_empty())
            .map(|l| starts_with_keyword(l.trim()))
            .unwrap_or(false),
    }
}

/// Guess the diagram language from its source.
pub fn detect_language(content: &str) -> &'static str {
    let first = content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");
    if first.starts_with("@start") {
        "plantuml"
    } else if first.starts_with("digraph") || first.starts_with("strict digraph") {
        "dot"
    } else {
        "mermaid"
    }
}

/// Check if a line begins with a diagram-grammar keyword.
pub fn starts_with_keyword(line: &str) -> bool {
    let line = line.trim();
    if FLOW_START_RE.is_match(line) || PIE_START_RE.is_match(line) {
        return true;
    }
    if STANDALONE_KEYWORDS.iter().any(|k| line == *k) {
        return true;
    }
    START_KEYWORDS.iter().any(|k| {
        line.strip_prefix(k)
            .map(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace) || rest.starts_with('{'))
            .unwrap_or(false)
    })
}

/// Strip a leading label phrase (`Diagram:`, `流程图：`). Returns the rest of
/// the line when a label was found.
pub fn strip_label(line: &str) -> Option<&str> {
    let line = line.trim();
    LABEL_PHRASES.iter().find_map(|label| {
        let rest = line.strip_prefix(label)?;
        let after = rest.trim_start_matches([':', '：']);
        let has_colon = after.len() != rest.len();
        // ASCII labels require a colon.
        if label.is_ascii() && !has_colon {
            return None;
        }
        Some(after.trim())
    })
}

/// Start heuristic for diagrams embedded in prose.
pub fn is_diagram_start(line: &str) -> bool {
    let line = line.trim();
    if starts_with_keyword(line) {
        return true;
    }
    match strip_label(line) {
        Some(rest) => rest.is_empty() || starts_with_keyword(rest),
        None => false,
    }
}

/// Check if a line is a numbered section label such as `3.4.2 Overview`.
pub fn is_section_label(line: &str) -> bool {
    SECTION_LABEL_RE.is_match(line.trim())
}

/// Check if a line uses any diagram vocabulary.
pub fn has_diagram_vocabulary(line: &str) -> bool {
    let line = line.trim();
    if starts_with_keyword(line) {
        return true;
    }
    let first = line
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    if BODY_KEYWORDS.contains(&first.as_str()) || first.starts_with("%%") {
        return true;
    }
    if CONNECTORS.iter().any(|c| line.contains(c)) {
        return true;
    }
    // `"Dogs" : 386` in pie charts, `task :a1, 2024-01-01, 3d` in gantt
    if line.contains(" :") {
        return true;
    }
    SHAPE_RE.is_match(line)
}

/// End heuristic for diagrams embedded in prose.
pub fn is_diagram_end(kind: &LineKind, raw: &str) -> bool {
    match kind {
        LineKind::Blank
        | LineKind::Heading { .. }
        | LineKind::ListItem { .. }
        | LineKind::TableRow
        | LineKind::Fence { .. } => true,
        LineKind::Text { .. } => is_section_label(raw) || !has_diagram_vocabulary(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagram_languages() {
        assert!(is_diagram_language("mermaid"));
        assert!(is_diagram_language("PlantUML"));
        assert!(!is_diagram_language("rust"));
    }

    #[test]
    fn test_diagram_fence() {
        assert!(is_diagram_fence(Some("mermaid"), ""));
        assert!(!is_diagram_fence(Some("python"), "graph TD\nA-->B"));
        assert!(is_diagram_fence(None, "\ngraph TD\nA-->B"));
        assert!(!is_diagram_fence(None, "fn main() {}"));
    }

    #[test]
    fn test_start_keywords() {
        assert!(starts_with_keyword("graph TD"));
        assert!(starts_with_keyword("flowchart LR"));
        assert!(starts_with_keyword("sequenceDiagram"));
        assert!(starts_with_keyword("pie title Pets"));
        assert!(starts_with_keyword("gantt"));
        assert!(!starts_with_keyword("graphs are fun"));
        assert!(!starts_with_keyword("pie is delicious"));
        assert!(!starts_with_keyword("gantt charts help planning"));
    }

    #[test]
    fn test_label_phrases() {
        assert!(is_diagram_start("Mermaid Chart:"));
        assert!(is_diagram_start("Diagram: graph LR"));
        assert!(is_diagram_start("流程图："));
        assert!(!is_diagram_start("Diagram: see the appendix"));
        assert!(!is_diagram_start("Diagrams help readers."));
        assert!(!is_diagram_start("流程图说明如下"));
        assert_eq!(strip_label("Diagram: graph LR"), Some("graph LR"));
    }

    #[test]
    fn test_end_heuristic() {
        let text = |s: &str| LineKind::Text {
            indented: false,
            text: s.to_string(),
        };
        assert!(!is_diagram_end(&text("A-->B"), "A-->B"));
        assert!(!is_diagram_end(&text("participant Alice"), "participant Alice"));
        assert!(!is_diagram_end(&text("A[Start]"), "A[Start]"));
        assert!(is_diagram_end(&text("The system then stores data."), "The system then stores data."));
        assert!(is_diagram_end(&text("3.4.2 Storage"), "3.4.2 Storage"));
        assert!(is_diagram_end(&LineKind::Blank, ""));
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("@startuml\nA -> B\n@enduml"), "plantuml");
        assert_eq!(detect_language("digraph G { a -> b }"), "dot");
        assert_eq!(detect_language("graph TD\nA-->B"), "mermaid");
    }
}
