//! Integration tests for quality checks over parsed documents.

use docbridge::model::Severity;
use docbridge::parse_str;
use docbridge::quality::{PatternRule, QualityChecker};

#[test]
fn test_heading_jump_sequences() {
    let jump = parse_str("# A\n\n### C\n", "md").unwrap();
    let report = QualityChecker::new().check(&jump);
    let findings: Vec<_> = report.findings_for("heading_jump").collect();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].line, Some(2));

    let steady = parse_str("# A\n\n## B\n\n### C\n", "md").unwrap();
    let report = QualityChecker::new().check(&steady);
    assert_eq!(report.findings_for("heading_jump").count(), 0);
}

#[test]
fn test_clean_document_scores_full() {
    let parsed = parse_str("# Title\n\nSome [docs](https://docs.rs).\n", "md").unwrap();
    let report = QualityChecker::new().check(&parsed);
    assert!(report.is_clean());
    assert_eq!(report.statistics.score, 100);
    assert_eq!(report.statistics.blocks_count, 2);
    assert_eq!(report.statistics.structure_count, 1);
}

#[test]
fn test_mixed_findings() {
    let input = "\
# Doc

| a | b |
| 1 | 2 |

```
```

```mermaid
graph LR
A-->B
```

![](empty.png) ![nothing]() [click]()
";
    let parsed = parse_str(input, "md").unwrap();
    let report = QualityChecker::new().check(&parsed);
    let stats = &report.statistics;

    assert_eq!(stats.distribution["malformed_table"], 1);
    assert_eq!(stats.distribution["empty_code_block"], 1);
    assert_eq!(stats.distribution["diagram_present"], 1);
    assert_eq!(stats.distribution["image_missing_source"], 1);
    assert_eq!(stats.distribution["empty_link"], 1);
    assert_eq!(stats.total_findings, 5);
    assert_eq!(stats.assets_count, 3);

    // warning 2 + info 1 + info 1 + error 3 + error 3 = 10
    assert_eq!(stats.score, 80);
    assert_eq!(report.count(Severity::Error), 2);
}

#[test]
fn test_threshold_and_pattern_rule() {
    let parsed = parse_str("# A\n\n### B\n\nTODO: write this\n", "md").unwrap();
    let rule = PatternRule::new("todo", r"^TODO\b", Severity::Info, "unfinished section").unwrap();
    let checker = QualityChecker::new()
        .with_rule(Box::new(rule))
        .with_threshold(Severity::Warning);
    let report = checker.check(&parsed);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].rule, "heading_jump");

    let report = QualityChecker::empty()
        .with_rule(Box::new(
            PatternRule::new("todo", r"^TODO\b", Severity::Info, "unfinished section").unwrap(),
        ))
        .check(&parsed);
    assert_eq!(report.findings[0].line, Some(4));
}

#[test]
fn test_report_serializes() {
    let parsed = parse_str("# A\n\n### B\n", "md").unwrap();
    let json = QualityChecker::new().check(&parsed).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["findings"][0]["severity"], "warning");
    assert_eq!(value["statistics"]["score"], 96);
}
