//! Built-in quality rules.

use super::Finding;
use crate::error::{Error, Result};
use crate::model::{Block, BlockKind, DiagnosticKind, Severity};
use crate::parser::ParsedDocument;
use crate::render::markup::{inline_tokens, Inline};
use regex::Regex;

/// A check over a parsed document.
///
/// Rules never fail: a document without the pattern a rule looks for simply
/// yields no findings.
pub trait QualityRule: Send + Sync {
    /// Stable rule name, used as the distribution key.
    fn name(&self) -> &str;

    /// Run the rule.
    fn check(&self, doc: &ParsedDocument) -> Vec<Finding>;
}

/// The rules a default [`super::QualityChecker`] runs.
pub fn default_rules() -> Vec<Box<dyn QualityRule>> {
    vec![
        Box::new(HeadingJumpRule),
        Box::new(EmptyCodeBlockRule),
        Box::new(MalformedTableRule),
        Box::new(DiagramPresentRule),
        Box::new(ImageMissingSourceRule),
        Box::new(EmptyLinkRule),
        Box::new(AssetUnavailableRule),
    ]
}

/// Headings that skip a level (`#` followed by `###`).
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingJumpRule;

impl QualityRule for HeadingJumpRule {
    fn name(&self) -> &str {
        "heading_jump"
    }

    fn check(&self, doc: &ParsedDocument) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut previous: Option<u8> = None;

        for block in doc.model.headings() {
            let level = block.level.unwrap_or(1);
            if let Some(prev) = previous {
                if level > prev + 1 {
                    findings.push(
                        Finding::new(
                            self.name(),
                            Severity::Warning,
                            format!("heading level jumps from {} to {}", prev, level),
                        )
                        .at_line(block.source_line)
                        .with_suggestion(format!("use a level {} heading", prev + 1)),
                    );
                }
            }
            previous = Some(level);
        }

        findings
    }
}

/// Code blocks without content.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCodeBlockRule;

impl QualityRule for EmptyCodeBlockRule {
    fn name(&self) -> &str {
        "empty_code_block"
    }

    fn check(&self, doc: &ParsedDocument) -> Vec<Finding> {
        doc.model
            .blocks_of(BlockKind::CodeBlock)
            .filter(|b| b.content.trim().is_empty())
            .map(|b| {
                Finding::new(self.name(), Severity::Info, "code block is empty")
                    .at_line(b.source_line)
                    .with_suggestion("remove the fence or add content")
            })
            .collect()
    }
}

/// Tables missing their separator row, as reported by the scanner.
#[derive(Debug, Clone, Copy, Default)]
pub struct MalformedTableRule;

impl QualityRule for MalformedTableRule {
    fn name(&self) -> &str {
        "malformed_table"
    }

    fn check(&self, doc: &ParsedDocument) -> Vec<Finding> {
        doc.diagnostics_of(DiagnosticKind::MalformedTable)
            .map(|d| {
                Finding::new(self.name(), Severity::Warning, d.message.clone())
                    .at_line(d.line)
                    .with_suggestion("add a `|---|` separator after the header row")
            })
            .collect()
    }
}

/// Diagram blocks, reported so callers know the document carries them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagramPresentRule;

impl QualityRule for DiagramPresentRule {
    fn name(&self) -> &str {
        "diagram_present"
    }

    fn check(&self, doc: &ParsedDocument) -> Vec<Finding> {
        doc.model
            .blocks_of(BlockKind::DiagramBlock)
            .map(|b| {
                let language = b.language.as_deref().unwrap_or("unknown");
                Finding::new(
                    self.name(),
                    Severity::Info,
                    format!("{} diagram detected", language),
                )
                .at_line(b.source_line)
            })
            .collect()
    }
}

/// Images with an empty source.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageMissingSourceRule;

impl QualityRule for ImageMissingSourceRule {
    fn name(&self) -> &str {
        "image_missing_source"
    }

    fn check(&self, doc: &ParsedDocument) -> Vec<Finding> {
        let mut findings = Vec::new();
        for_each_inline(&doc.model.blocks, |line, token| {
            if let Inline::Image { alt, src } = token {
                if src.trim().is_empty() {
                    findings.push(
                        Finding::new(
                            self.name(),
                            Severity::Error,
                            format!("image \"{}\" has no source", alt),
                        )
                        .at_line(line)
                        .with_suggestion("point the image at a file or URL"),
                    );
                }
            }
        });
        findings
    }
}

/// Links with an empty URL (error) or empty text (warning).
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyLinkRule;

impl QualityRule for EmptyLinkRule {
    fn name(&self) -> &str {
        "empty_link"
    }

    fn check(&self, doc: &ParsedDocument) -> Vec<Finding> {
        let mut findings = Vec::new();
        for_each_inline(&doc.model.blocks, |line, token| {
            if let Inline::Link { text, href } = token {
                if href.trim().is_empty() {
                    findings.push(
                        Finding::new(self.name(), Severity::Error, "link has an empty URL")
                            .at_line(line)
                            .with_suggestion("add a target or remove the link"),
                    );
                } else if text.trim().is_empty() {
                    findings.push(
                        Finding::new(
                            self.name(),
                            Severity::Warning,
                            format!("link to {} has no text", href.trim()),
                        )
                        .at_line(line)
                        .with_suggestion("describe the link target"),
                    );
                }
            }
        });
        findings
    }
}

/// Resources kept as references because they could not be copied.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetUnavailableRule;

impl QualityRule for AssetUnavailableRule {
    fn name(&self) -> &str {
        "asset_unavailable"
    }

    fn check(&self, doc: &ParsedDocument) -> Vec<Finding> {
        doc.diagnostics_of(DiagnosticKind::AssetUnavailable)
            .map(|d| {
                Finding::new(self.name(), Severity::Warning, d.message.clone())
                    .at_line(d.line)
                    .with_suggestion("check that the file exists or the URL is reachable")
            })
            .collect()
    }
}

/// User-defined rule matching a regex against each line of block text.
#[derive(Debug, Clone)]
pub struct PatternRule {
    name: String,
    pattern: Regex,
    severity: Severity,
    message: String,
}

impl PatternRule {
    /// Create a pattern rule. Fails if `pattern` is not a valid regex.
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        severity: Severity,
        message: impl Into<String>,
    ) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| Error::Other(format!("invalid pattern {:?}: {}", pattern, e)))?;
        Ok(Self {
            name: name.into(),
            pattern,
            severity,
            message: message.into(),
        })
    }
}

impl QualityRule for PatternRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, doc: &ParsedDocument) -> Vec<Finding> {
        let mut findings = Vec::new();
        for block in &doc.model.blocks {
            for (offset, line) in block.content.lines().enumerate() {
                if let Some(m) = self.pattern.find(line) {
                    findings.push(
                        Finding::new(
                            &self.name,
                            self.severity,
                            format!("{}: {:?}", self.message, m.as_str()),
                        )
                        .at_line(block.source_line + offset),
                    );
                }
            }
        }
        findings
    }
}

fn for_each_inline<'a>(blocks: &'a [Block], mut f: impl FnMut(usize, Inline<'a>)) {
    for block in blocks.iter().filter(|b| !b.is_literal()) {
        for (offset, line) in block.content.lines().enumerate() {
            for token in inline_tokens(line) {
                f(block.source_line + offset, token);
            }
        }
    }
}
