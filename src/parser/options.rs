//! Parsing options and configuration.

use crate::render::MarkupOptions;

/// Options for parsing documents into a [`crate::model::DocumentModel`].
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Register images, code and diagrams with the resource registry
    pub extract_assets: bool,

    /// Override the parser's default for diagram detection in unfenced text
    pub prose_diagrams: Option<bool>,

    /// NFC-normalize decoded text
    pub normalize_unicode: bool,

    /// Domain tag that takes precedence over metadata
    pub domain_tag: Option<String>,

    /// Styled layer options
    pub markup: MarkupOptions,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable asset extraction.
    pub fn with_assets(mut self, extract: bool) -> Self {
        self.extract_assets = extract;
        self
    }

    /// Force prose diagram detection on or off.
    pub fn with_prose_diagrams(mut self, enabled: bool) -> Self {
        self.prose_diagrams = Some(enabled);
        self
    }

    /// Enable or disable Unicode normalization.
    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize_unicode = normalize;
        self
    }

    /// Set the domain tag.
    pub fn with_domain_tag(mut self, tag: impl Into<String>) -> Self {
        self.domain_tag = Some(tag.into());
        self
    }

    /// Set markup options.
    pub fn with_markup(mut self, markup: MarkupOptions) -> Self {
        self.markup = markup;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            extract_assets: true,
            prose_diagrams: None,
            normalize_unicode: true,
            domain_tag: None,
            markup: MarkupOptions::default(),
        }
    }
}
