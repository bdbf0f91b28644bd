//! Rendering options and configuration.

use super::JsonFormat;

/// Options controlling generation of the styled markup layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupOptions {
    /// Add `id="sec-N"` anchors to headings
    pub heading_anchors: bool,

    /// Keep single line breaks inside paragraphs as `<br/>`
    pub preserve_line_breaks: bool,

    /// Whitespace columns per list nesting level
    pub indent_unit: usize,
}

impl MarkupOptions {
    /// Create new markup options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable heading anchors.
    pub fn with_heading_anchors(mut self, anchors: bool) -> Self {
        self.heading_anchors = anchors;
        self
    }

    /// Enable or disable line break preservation.
    pub fn with_line_breaks(mut self, preserve: bool) -> Self {
        self.preserve_line_breaks = preserve;
        self
    }

    /// Set the list indent width. Zero is treated as one.
    pub fn with_indent_unit(mut self, unit: usize) -> Self {
        self.indent_unit = unit.max(1);
        self
    }
}

impl Default for MarkupOptions {
    fn default() -> Self {
        Self {
            heading_anchors: true,
            preserve_line_breaks: false,
            indent_unit: 2,
        }
    }
}

/// Options passed to a [`super::DocumentRenderer`].
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// JSON layout for the wire form
    pub json_format: JsonFormat,

    /// Prefix markup output with a YAML front matter block
    pub include_frontmatter: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the JSON layout.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Enable or disable frontmatter.
    pub fn with_frontmatter(mut self, include: bool) -> Self {
        self.include_frontmatter = include;
        self
    }
}
