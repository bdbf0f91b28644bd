//! Soft diagnostics for recoverable structural anomalies.

use serde::{Deserialize, Serialize};

/// A recoverable anomaly found while building a document model.
///
/// Diagnostics never abort a parse: the offending construct is still emitted
/// as best-effort content and the diagnostic is returned next to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What went wrong
    pub kind: DiagnosticKind,

    /// 0-based line in the original input
    pub line: usize,

    /// Human readable description
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(kind: DiagnosticKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }

    /// Severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: {} ({}): {}",
            self.line + 1,
            self.severity(),
            self.kind,
            self.message
        )
    }
}

/// Kind of recoverable anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Leading metadata block could not be parsed
    MalformedFrontMatter,
    /// Table without an alignment/separator row
    MalformedTable,
    /// Code fence still open at end of input
    UnclosedFence,
    /// Code fence with no content
    EmptyCodeBlock,
    /// Diagram block with no content
    EmptyDiagram,
    /// Resource could not be materialized; kept as a reference
    AssetUnavailable,
}

impl DiagnosticKind {
    /// Default severity for this kind.
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::EmptyCodeBlock | DiagnosticKind::EmptyDiagram => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DiagnosticKind::MalformedFrontMatter => "malformed_front_matter",
            DiagnosticKind::MalformedTable => "malformed_table",
            DiagnosticKind::UnclosedFence => "unclosed_fence",
            DiagnosticKind::EmptyCodeBlock => "empty_code_block",
            DiagnosticKind::EmptyDiagram => "empty_diagram",
            DiagnosticKind::AssetUnavailable => "asset_unavailable",
        };
        f.write_str(name)
    }
}

/// Severity of a diagnostic or quality finding.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    #[default]
    Info,
    /// Worth fixing
    Warning,
    /// Broken content
    Error,
}

impl Severity {
    /// Numeric weight (info=1, warning=2, error=3).
    pub fn weight(&self) -> u32 {
        match self {
            Severity::Info => 1,
            Severity::Warning => 2,
            Severity::Error => 3,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}
