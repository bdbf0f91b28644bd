//! Plain text parser.

use super::{assemble, decode, DocumentParser, ParseOptions, ParsedDocument, PipelineConfig};
use super::ScanOptions;
use crate::assets::ResourceRegistry;
use crate::error::Result;

/// Plain text parser.
///
/// Plain text has no fences, so diagrams are found with the prose
/// heuristics. The first non-blank line doubles as the title.
#[derive(Debug, Clone, Default)]
pub struct PlainTextParser {
    _private: (),
}

impl PlainTextParser {
    /// Create a new plain text parser.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentParser for PlainTextParser {
    fn name(&self) -> &str {
        "text"
    }

    fn supported_formats(&self) -> &[&str] {
        &["txt", "text"]
    }

    fn parse(
        &self,
        input: &[u8],
        options: &ParseOptions,
        registry: &mut ResourceRegistry,
    ) -> Result<ParsedDocument> {
        let text = decode::decode_text(input, options.normalize_unicode)?;
        let config = PipelineConfig {
            scan: ScanOptions::new()
                .with_fences(false)
                .with_prose_diagrams(options.prose_diagrams.unwrap_or(true)),
            title_from_first_line: true,
        };
        assemble(&text, &config, options, registry)
    }
}
