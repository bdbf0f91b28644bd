//! Markdown parser.

use super::{assemble, decode, DocumentParser, ParseOptions, ParsedDocument, PipelineConfig};
use super::ScanOptions;
use crate::assets::ResourceRegistry;
use crate::error::Result;

/// Markdown parser.
///
/// Fences are recognized; diagrams in unfenced text are only detected when
/// [`ParseOptions::prose_diagrams`] asks for it.
#[derive(Debug, Clone, Default)]
pub struct MarkdownParser {
    _private: (),
}

impl MarkdownParser {
    /// Create a new Markdown parser.
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn pipeline_config(&self, options: &ParseOptions) -> PipelineConfig {
        PipelineConfig {
            scan: ScanOptions::new()
                .with_fences(true)
                .with_prose_diagrams(options.prose_diagrams.unwrap_or(false)),
            title_from_first_line: false,
        }
    }
}

impl DocumentParser for MarkdownParser {
    fn name(&self) -> &str {
        "markdown"
    }

    fn supported_formats(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn parse(
        &self,
        input: &[u8],
        options: &ParseOptions,
        registry: &mut ResourceRegistry,
    ) -> Result<ParsedDocument> {
        let text = decode::decode_text(input, options.normalize_unicode)?;
        assemble(&text, &self.pipeline_config(options), options, registry)
    }
}
