//! Block-level types produced by the block scanner.

use serde::{Deserialize, Serialize};

/// One structurally typed unit of document content.
///
/// Blocks form a flat, ordered sequence. Nesting (list depth, heading level)
/// is carried as an attribute, never as a parent/child edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block type
    pub kind: BlockKind,

    /// Heading level (1-6) for headings, nesting depth for lists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,

    /// Ordering kind for lists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordered: Option<bool>,

    /// Language tag for code and diagram blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Text content. Fenced content is kept verbatim.
    pub content: String,

    /// 0-based line in the original input where the block starts
    pub source_line: usize,
}

impl Block {
    fn new(kind: BlockKind, content: impl Into<String>, source_line: usize) -> Self {
        Self {
            kind,
            level: None,
            ordered: None,
            language: None,
            content: content.into(),
            source_line,
        }
    }

    /// Create a heading block.
    pub fn heading(level: u8, text: impl Into<String>, source_line: usize) -> Self {
        let mut block = Self::new(BlockKind::Heading, text, source_line);
        block.level = Some(level.clamp(1, 6));
        block
    }

    /// Create a paragraph block.
    pub fn paragraph(text: impl Into<String>, source_line: usize) -> Self {
        Self::new(BlockKind::Paragraph, text, source_line)
    }

    /// Create a list block. `depth` is the nesting depth of its first item.
    pub fn list(ordered: bool, depth: u8, content: impl Into<String>, source_line: usize) -> Self {
        let mut block = Self::new(BlockKind::List, content, source_line);
        block.level = Some(depth);
        block.ordered = Some(ordered);
        block
    }

    /// Create a table block from its raw rows.
    pub fn table(rows: impl Into<String>, source_line: usize) -> Self {
        Self::new(BlockKind::Table, rows, source_line)
    }

    /// Create a code block.
    pub fn code(language: Option<String>, content: impl Into<String>, source_line: usize) -> Self {
        let mut block = Self::new(BlockKind::CodeBlock, content, source_line);
        block.language = language;
        block
    }

    /// Create a diagram block.
    pub fn diagram(
        language: Option<String>,
        content: impl Into<String>,
        source_line: usize,
    ) -> Self {
        let mut block = Self::new(BlockKind::DiagramBlock, content, source_line);
        block.language = language;
        block
    }

    /// Check if this block is a heading.
    pub fn is_heading(&self) -> bool {
        self.kind == BlockKind::Heading
    }

    /// Check if this block is a list.
    pub fn is_list(&self) -> bool {
        self.kind == BlockKind::List
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        self.kind == BlockKind::Table
    }

    /// Check if this block holds literal fenced content (code or diagram).
    pub fn is_literal(&self) -> bool {
        matches!(self.kind, BlockKind::CodeBlock | BlockKind::DiagramBlock)
    }

    /// Number of source lines the content spans.
    pub fn line_count(&self) -> usize {
        self.content.lines().count().max(1)
    }
}

/// Type of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// A heading line
    Heading,
    /// Running text
    Paragraph,
    /// A run of list items
    List,
    /// Delimiter-bounded rows
    Table,
    /// Fenced literal code
    CodeBlock,
    /// Diagram source (fenced or detected in prose)
    DiagramBlock,
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockKind::Heading => write!(f, "heading"),
            BlockKind::Paragraph => write!(f, "paragraph"),
            BlockKind::List => write!(f, "list"),
            BlockKind::Table => write!(f, "table"),
            BlockKind::CodeBlock => write!(f, "code_block"),
            BlockKind::DiagramBlock => write!(f, "diagram_block"),
        }
    }
}
