//! Single-pass block scanner.
//!
//! The scanner is an explicit finite-state machine. [`transition`] is a pure
//! function from the current [`ScanState`] and a classified line to a
//! [`Step`]; [`BlockScanner`] applies the steps, accumulates the lines of
//! the open block and flushes finished blocks in source order.

use super::diagram;
use super::line::{classify, LineKind};
use crate::model::{is_separator_row, Block, Diagnostic, DiagnosticKind};

/// Scanner state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanState {
    /// No block open
    #[default]
    Default,
    /// Accumulating paragraph text
    InParagraph,
    /// Accumulating list items; `depth` is the depth of the first item
    InList { ordered: bool, depth: u8 },
    /// Inside a fenced literal block
    InCodeFence { language: Option<String> },
    /// Accumulating table rows
    InTable,
    /// Inside a diagram detected in prose
    InDiagramBlock,
}

/// Action taken for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Add the line to the open block.
    Append,
    /// Close the open block and open a new one in the given state.
    Open(ScanState),
    /// Close the open block and emit a heading.
    Heading,
    /// Close the open block; the line is consumed.
    Close,
    /// Close the open block and scan the line again from `Default`.
    CloseAndReplay,
    /// Ignore the line.
    Skip,
}

/// Scanner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Treat triple-backtick lines as fences
    pub recognize_fences: bool,

    /// Detect diagrams in unfenced text
    pub prose_diagrams: bool,

    /// Whitespace width of one list nesting level
    pub indent_unit: usize,
}

impl ScanOptions {
    /// Create new scan options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable fence recognition.
    pub fn with_fences(mut self, recognize: bool) -> Self {
        self.recognize_fences = recognize;
        self
    }

    /// Enable or disable prose diagram detection.
    pub fn with_prose_diagrams(mut self, enabled: bool) -> Self {
        self.prose_diagrams = enabled;
        self
    }

    /// Set the list indent unit.
    pub fn with_indent_unit(mut self, unit: usize) -> Self {
        self.indent_unit = unit.max(1);
        self
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            recognize_fences: true,
            prose_diagrams: false,
            indent_unit: 2,
        }
    }
}

/// Compute the step for one line.
///
/// `raw` is the unmodified line; `kind` is its classification.
pub fn transition(state: &ScanState, kind: &LineKind, raw: &str, options: &ScanOptions) -> Step {
    match state {
        ScanState::Default => match kind {
            LineKind::Blank => Step::Skip,
            LineKind::Heading { .. } => Step::Heading,
            LineKind::Fence { language } => Step::Open(ScanState::InCodeFence {
                language: language.clone(),
            }),
            LineKind::ListItem { ordered, depth, .. } => Step::Open(ScanState::InList {
                ordered: *ordered,
                depth: *depth,
            }),
            LineKind::TableRow => Step::Open(ScanState::InTable),
            LineKind::Text { .. } => {
                if options.prose_diagrams && diagram::is_diagram_start(raw) {
                    Step::Open(ScanState::InDiagramBlock)
                } else {
                    Step::Open(ScanState::InParagraph)
                }
            }
        },

        ScanState::InParagraph => match kind {
            LineKind::Blank => Step::Close,
            LineKind::Heading { .. } => Step::Heading,
            LineKind::Fence { .. } | LineKind::ListItem { .. } | LineKind::TableRow => {
                Step::CloseAndReplay
            }
            LineKind::Text { .. } => {
                if options.prose_diagrams && diagram::is_diagram_start(raw) {
                    Step::CloseAndReplay
                } else {
                    Step::Append
                }
            }
        },

        ScanState::InList { ordered, depth } => match kind {
            LineKind::Blank => Step::Close,
            LineKind::Heading { .. } => Step::Heading,
            LineKind::Fence { .. } | LineKind::TableRow => Step::CloseAndReplay,
            LineKind::ListItem {
                ordered: item_ordered,
                depth: item_depth,
                ..
            } => {
                if item_depth > depth || (item_depth == depth && item_ordered == ordered) {
                    Step::Append
                } else {
                    Step::Open(ScanState::InList {
                        ordered: *item_ordered,
                        depth: *item_depth,
                    })
                }
            }
            LineKind::Text { indented: true, .. } => Step::Append,
            LineKind::Text { .. } => Step::CloseAndReplay,
        },

        ScanState::InCodeFence { .. } => match kind {
            LineKind::Fence { language: None } => Step::Close,
            _ => Step::Append,
        },

        ScanState::InTable => match kind {
            LineKind::TableRow => Step::Append,
            LineKind::Blank => Step::Close,
            LineKind::Heading { .. } => Step::Heading,
            _ => Step::CloseAndReplay,
        },

        ScanState::InDiagramBlock => {
            if !diagram::is_diagram_end(kind, raw) {
                Step::Append
            } else if matches!(kind, LineKind::Blank) {
                Step::Close
            } else {
                Step::CloseAndReplay
            }
        }
    }
}

/// Blocks and soft diagnostics produced by one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    pub blocks: Vec<Block>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Line-oriented block scanner.
#[derive(Debug, Clone, Default)]
pub struct BlockScanner {
    options: ScanOptions,
}

impl BlockScanner {
    /// Create a scanner with the given options.
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    /// Scan `body`. `line_offset` is the index of its first line in the
    /// original input, so `source_line` values refer to the original text.
    pub fn scan(&self, body: &str, line_offset: usize) -> ScanOutput {
        let mut run = ScanRun::new(&self.options);
        for (i, raw) in body.lines().enumerate() {
            run.feed(raw, line_offset + i);
        }
        run.finish()
    }
}

struct OpenBlock<'a> {
    start: usize,
    lines: Vec<&'a str>,
}

struct ScanRun<'o, 'a> {
    options: &'o ScanOptions,
    state: ScanState,
    open: Option<OpenBlock<'a>>,
    output: ScanOutput,
}

impl<'o, 'a> ScanRun<'o, 'a> {
    fn new(options: &'o ScanOptions) -> Self {
        Self {
            options,
            state: ScanState::Default,
            open: None,
            output: ScanOutput::default(),
        }
    }

    fn feed(&mut self, raw: &'a str, line_no: usize) {
        let mut kind = classify(raw, self.options.indent_unit);
        if !self.options.recognize_fences && matches!(kind, LineKind::Fence { .. }) {
            kind = LineKind::Text {
                indented: raw.starts_with(char::is_whitespace),
                text: raw.trim().to_string(),
            };
        }

        loop {
            let step = transition(&self.state, &kind, raw, self.options);
            log::trace!("line {}: {:?} in {:?} -> {:?}", line_no, kind, self.state, step);
            match step {
                Step::Skip => {}
                Step::Append => {
                    if let Some(open) = self.open.as_mut() {
                        open.lines.push(raw);
                    }
                }
                Step::Open(state) => {
                    self.flush();
                    let lines = match state {
                        ScanState::InCodeFence { .. } => Vec::new(),
                        _ => vec![raw],
                    };
                    self.state = state;
                    self.open = Some(OpenBlock {
                        start: line_no,
                        lines,
                    });
                }
                Step::Heading => {
                    self.flush();
                    if let LineKind::Heading { level, text } = &kind {
                        self.output
                            .blocks
                            .push(Block::heading(*level, text.clone(), line_no));
                    }
                }
                Step::Close => self.flush(),
                Step::CloseAndReplay => {
                    self.flush();
                    continue;
                }
            }
            break;
        }
    }

    fn finish(mut self) -> ScanOutput {
        if let (ScanState::InCodeFence { .. }, Some(open)) = (&self.state, &self.open) {
            log::debug!("fence opened at line {} is never closed", open.start);
            self.output.diagnostics.push(Diagnostic::new(
                DiagnosticKind::UnclosedFence,
                open.start,
                "code fence is not closed before end of input",
            ));
        }
        self.flush();
        self.output
    }

    /// Emit the open block (if any) and return to `Default`.
    fn flush(&mut self) {
        let state = std::mem::take(&mut self.state);
        let Some(open) = self.open.take() else {
            return;
        };
        let start = open.start;

        match state {
            ScanState::Default => {}
            ScanState::InParagraph => {
                self.output
                    .blocks
                    .push(Block::paragraph(join_trimmed(&open.lines), start));
            }
            ScanState::InList { ordered, depth } => {
                let content = open
                    .lines
                    .iter()
                    .map(|l| l.trim_end())
                    .collect::<Vec<_>>()
                    .join("\n");
                self.output
                    .blocks
                    .push(Block::list(ordered, depth, content, start));
            }
            ScanState::InCodeFence { language } => self.flush_fence(language, &open),
            ScanState::InTable => self.flush_table(&open),
            ScanState::InDiagramBlock => self.flush_prose_diagram(&open),
        }
    }

    fn flush_fence(&mut self, language: Option<String>, open: &OpenBlock<'_>) {
        let content = open.lines.join("\n");
        let empty = content.trim().is_empty();

        if diagram::is_diagram_fence(language.as_deref(), &content) {
            let language =
                language.or_else(|| Some(diagram::detect_language(&content).to_string()));
            log::debug!("fence at line {} classified as {:?} diagram", open.start, language);
            if empty {
                self.output.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::EmptyDiagram,
                    open.start,
                    "diagram block has no content",
                ));
            }
            self.output
                .blocks
                .push(Block::diagram(language, content, open.start));
        } else {
            if empty {
                self.output.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::EmptyCodeBlock,
                    open.start,
                    "code block has no content",
                ));
            }
            self.output
                .blocks
                .push(Block::code(language, content, open.start));
        }
    }

    fn flush_table(&mut self, open: &OpenBlock<'_>) {
        if open.lines.len() < 2 {
            self.output
                .blocks
                .push(Block::paragraph(join_trimmed(&open.lines), open.start));
            return;
        }
        if !is_separator_row(open.lines[1]) {
            self.output.diagnostics.push(Diagnostic::new(
                DiagnosticKind::MalformedTable,
                open.start,
                "table has no alignment/separator row",
            ));
        }
        self.output
            .blocks
            .push(Block::table(join_trimmed(&open.lines), open.start));
    }

    fn flush_prose_diagram(&mut self, open: &OpenBlock<'_>) {
        let mut lines: Vec<&str> = open.lines.iter().map(|l| l.trim_end()).collect();
        if let Some(first) = lines.first_mut() {
            if let Some(rest) = diagram::strip_label(first) {
                *first = rest;
            }
        }
        while lines.first().map(|l| l.trim().is_empty()).unwrap_or(false) {
            lines.remove(0);
        }

        if lines.is_empty() {
            // Only a label was found; keep it as prose.
            self.output.diagnostics.push(Diagnostic::new(
                DiagnosticKind::EmptyDiagram,
                open.start,
                "diagram label is not followed by diagram source",
            ));
            self.output
                .blocks
                .push(Block::paragraph(join_trimmed(&open.lines), open.start));
            return;
        }

        let content = lines.join("\n");
        let language = diagram::detect_language(&content).to_string();
        log::debug!("prose diagram at line {} ({})", open.start, language);
        self.output
            .blocks
            .push(Block::diagram(Some(language), content, open.start));
    }
}

fn join_trimmed(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|l| l.trim())
        .collect::<Vec<_>>()
        .join("\n")
}
