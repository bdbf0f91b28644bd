//! Document quality checks.
//!
//! Quality findings are data, not errors. A [`QualityChecker`] runs a set
//! of [`QualityRule`]s over a [`ParsedDocument`] and summarizes the result
//! in a [`QualityReport`].
//!
//! # Example
//!
//! ```
//! use docbridge::quality::QualityChecker;
//!
//! let parsed = docbridge::parse_str("# A\n\n### C\n", "md")?;
//! let report = QualityChecker::new().check(&parsed);
//! assert_eq!(report.statistics.total_findings, 1);
//! # Ok::<(), docbridge::Error>(())
//! ```

mod rules;

pub use rules::{
    default_rules, AssetUnavailableRule, DiagramPresentRule, EmptyCodeBlockRule, EmptyLinkRule,
    HeadingJumpRule, ImageMissingSourceRule, MalformedTableRule, PatternRule, QualityRule,
};

use crate::error::{Error, Result};
use crate::model::Severity;
use crate::parser::ParsedDocument;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One quality finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Name of the rule that produced it
    pub rule: String,
    /// Severity
    pub severity: Severity,
    /// Source line (0-based), if the finding has one
    pub line: Option<usize>,
    /// Description
    pub message: String,
    /// Suggested fix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Finding {
    /// Create a finding without a line or suggestion.
    pub fn new(rule: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            severity,
            line: None,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Attach a source line.
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Attach a suggested fix.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Summary numbers for a quality report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityStatistics {
    /// Findings kept after the threshold
    pub total_findings: usize,
    /// Resources referenced by the document
    pub assets_count: usize,
    /// Blocks in the document
    pub blocks_count: usize,
    /// Structure items in the document
    pub structure_count: usize,
    /// 100 minus twice the summed severity weights, floored at zero
    pub score: u32,
    /// Finding count per rule name
    pub distribution: BTreeMap<String, usize>,
}

/// Result of a quality check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Findings ordered by line (findings without a line last)
    pub findings: Vec<Finding>,
    /// Summary
    pub statistics: QualityStatistics,
}

impl QualityReport {
    /// Check if there are no findings.
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Number of findings with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    /// Findings produced by one rule.
    pub fn findings_for<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a Finding> {
        self.findings.iter().filter(move |f| f.rule == rule)
    }

    /// Serialize the report as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
    }
}

/// Runs quality rules over parsed documents.
pub struct QualityChecker {
    rules: Vec<Box<dyn QualityRule>>,
    threshold: Severity,
    suggestions: bool,
}

impl QualityChecker {
    /// Create a checker with the built-in rules.
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
            threshold: Severity::Info,
            suggestions: true,
        }
    }

    /// Create a checker with no rules.
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            ..Self::new()
        }
    }

    /// Add a rule.
    pub fn with_rule(mut self, rule: Box<dyn QualityRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Drop findings below `threshold`.
    pub fn with_threshold(mut self, threshold: Severity) -> Self {
        self.threshold = threshold;
        self
    }

    /// Keep or strip suggested fixes.
    pub fn with_suggestions(mut self, enabled: bool) -> Self {
        self.suggestions = enabled;
        self
    }

    /// Names of the configured rules.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run every rule and summarize.
    pub fn check(&self, doc: &ParsedDocument) -> QualityReport {
        let mut findings: Vec<Finding> = self
            .rules
            .iter()
            .flat_map(|rule| rule.check(doc))
            .filter(|f| f.severity >= self.threshold)
            .map(|mut f| {
                if !self.suggestions {
                    f.suggestion = None;
                }
                f
            })
            .collect();
        findings.sort_by_key(|f| f.line.unwrap_or(usize::MAX));

        let mut distribution = BTreeMap::new();
        for finding in &findings {
            *distribution.entry(finding.rule.clone()).or_insert(0) += 1;
        }

        let penalty: u32 = findings.iter().map(|f| 2 * f.severity.weight()).sum();
        let statistics = QualityStatistics {
            total_findings: findings.len(),
            assets_count: doc.model.assets.len(),
            blocks_count: doc.model.blocks.len(),
            structure_count: doc.model.structure.len(),
            score: 100u32.saturating_sub(penalty),
            distribution,
        };

        log::debug!(
            "Quality check: {} findings, score {}",
            statistics.total_findings,
            statistics.score
        );

        QualityReport {
            findings,
            statistics,
        }
    }
}

impl Default for QualityChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QualityChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QualityChecker")
            .field("rules", &self.rule_names())
            .field("threshold", &self.threshold)
            .field("suggestions", &self.suggestions)
            .finish()
    }
}
