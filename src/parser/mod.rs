//! Format-specific parsers and the shared assembly pipeline.
//!
//! Every parser implements [`DocumentParser`] and returns a complete
//! [`ParsedDocument`] or an error, never a partially populated model.
//! [`ParserRegistry`] dispatches on a lowercase format name.
//!
//! # Example
//!
//! ```no_run
//! use docbridge::assets::ResourceRegistry;
//! use docbridge::parser::{ParseOptions, ParserRegistry};
//!
//! fn main() -> docbridge::Result<()> {
//!     let parsers = ParserRegistry::with_defaults();
//!     let mut resources = ResourceRegistry::in_memory();
//!     let parsed = parsers.parse_file("notes.md", &ParseOptions::default(), &mut resources)?;
//!     println!("{} blocks", parsed.model.block_count());
//!     Ok(())
//! }
//! ```

pub mod decode;
pub mod diagram;
pub mod front_matter;
pub mod line;
mod markdown;
mod options;
pub mod scanner;
pub mod semantics;
mod text;

pub use markdown::MarkdownParser;
pub use options::ParseOptions;
pub use scanner::{BlockScanner, ScanOptions, ScanOutput, ScanState, Step};
pub use text::PlainTextParser;

use crate::assets::{extract_assets, ExtractedAssets, ResourceRegistry};
use crate::error::{Error, Result};
use crate::model::{Diagnostic, DiagnosticKind, DocumentBuilder, DocumentModel, MetaValue};
use crate::render::render_markup;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// A document model together with the soft diagnostics raised while
/// building it.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    /// The frozen model
    pub model: DocumentModel,

    /// Recoverable anomalies, ordered by line
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedDocument {
    /// Diagnostics of one kind.
    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    /// Check if any diagnostic of the given kind was raised.
    pub fn has_diagnostic(&self, kind: DiagnosticKind) -> bool {
        self.diagnostics_of(kind).next().is_some()
    }
}

/// Trait for format-specific parsers.
///
/// Implement this trait to add support for a new input format.
pub trait DocumentParser: Send + Sync {
    /// Get the name of this parser.
    fn name(&self) -> &str;

    /// Get the supported formats.
    ///
    /// Formats should be lowercase without a leading dot (e.g., `["md"]`).
    fn supported_formats(&self) -> &[&str];

    /// Parse raw input into a document model.
    fn parse(
        &self,
        input: &[u8],
        options: &ParseOptions,
        registry: &mut ResourceRegistry,
    ) -> Result<ParsedDocument>;

    /// Check if this parser supports the given format.
    fn supports_format(&self, format: &str) -> bool {
        let format = format.to_lowercase();
        self.supported_formats().iter().any(|f| *f == format)
    }
}

/// Per-parser settings for the shared pipeline.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Scanner configuration
    pub scan: ScanOptions,

    /// Use the first non-blank line as title when none is found
    pub title_from_first_line: bool,
}

/// Run the shared pipeline over decoded text.
///
/// Front matter, block scanning, asset extraction, semantic indexing and
/// markup generation feed one [`DocumentBuilder`].
pub fn assemble(
    text: &str,
    config: &PipelineConfig,
    options: &ParseOptions,
    registry: &mut ResourceRegistry,
) -> Result<ParsedDocument> {
    let fm = front_matter::extract(text);
    let mut diagnostics: Vec<Diagnostic> = fm.diagnostic.iter().cloned().collect();

    let mut meta = fm.meta;
    if config.title_from_first_line
        && !fm.declared
        && fm.diagnostic.is_none()
        && !meta.contains_key("title")
    {
        if let Some(first) = fm.body.lines().map(str::trim).find(|l| !l.is_empty()) {
            meta.insert("title", MetaValue::from(first));
        }
    }

    let scanned = BlockScanner::new(config.scan.clone()).scan(fm.body, fm.body_line_offset);
    diagnostics.extend(scanned.diagnostics);
    let blocks = scanned.blocks;

    let extracted = if options.extract_assets {
        extract_assets(&blocks, registry)
    } else {
        ExtractedAssets::references_only(&blocks)
    };

    let sem = semantics::extract_semantics(&blocks, &meta, options.domain_tag.as_deref());
    let structure = semantics::structure_items(&blocks, &extracted.images);
    let markup_options = options
        .markup
        .clone()
        .with_indent_unit(config.scan.indent_unit);
    let markup = render_markup(&blocks, &extracted.refs, &markup_options);

    let mut builder = DocumentBuilder::new();
    builder.extend_meta(meta);
    // `title` is always present, possibly empty
    builder.insert_meta("title", MetaValue::from(""));
    for block in blocks {
        builder.add_block(block)?;
    }
    for item in structure {
        builder.add_structure_item(item);
    }
    for record in extracted.records {
        builder.add_asset(record);
    }
    for (id, info) in sem.section_id {
        builder.add_section(id, info);
    }
    for (id, kind) in sem.list_type {
        builder.add_list_type(id, kind);
    }
    for (id, kind) in sem.table_type {
        builder.add_table_type(id, kind);
    }
    builder.set_domain_tag(sem.domain_tag);
    builder.push_markup(&markup);
    let model = builder.build()?;

    diagnostics.extend(extracted.diagnostics);
    diagnostics.sort_by_key(|d| d.line);

    log::debug!(
        "Assembled {} blocks, {} assets, {} diagnostics",
        model.blocks.len(),
        model.assets.len(),
        diagnostics.len()
    );

    Ok(ParsedDocument { model, diagnostics })
}

/// Registry for document parsers.
///
/// The registry maps format names to parsers and provides convenient
/// methods for parsing documents.
pub struct ParserRegistry {
    parsers: HashMap<String, Arc<dyn DocumentParser>>,
    by_name: HashMap<String, Arc<dyn DocumentParser>>,
}

impl ParserRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the built-in parsers (Markdown, plain text).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MarkdownParser::new()));
        registry.register(Arc::new(PlainTextParser::new()));
        registry
    }

    /// Register a parser for all its supported formats.
    pub fn register(&mut self, parser: Arc<dyn DocumentParser>) {
        for format in parser.supported_formats() {
            self.parsers.insert(format.to_lowercase(), parser.clone());
        }
        self.by_name.insert(parser.name().to_lowercase(), parser);
    }

    /// Get a parser by format.
    pub fn get(&self, format: &str) -> Option<Arc<dyn DocumentParser>> {
        self.parsers.get(&format.to_lowercase()).cloned()
    }

    /// Get a parser by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentParser>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if a format is supported.
    pub fn supports(&self, format: &str) -> bool {
        self.parsers.contains_key(&format.to_lowercase())
    }

    /// Get all supported formats, sorted.
    pub fn supported_formats(&self) -> Vec<&str> {
        let mut formats: Vec<&str> = self.parsers.keys().map(|s| s.as_str()).collect();
        formats.sort_unstable();
        formats
    }

    /// Parse input with the parser registered for `format`.
    pub fn parse(
        &self,
        format: &str,
        input: &[u8],
        options: &ParseOptions,
        registry: &mut ResourceRegistry,
    ) -> Result<ParsedDocument> {
        let parser = self
            .get(format)
            .ok_or_else(|| Error::UnsupportedFormat(format.to_string()))?;
        log::debug!("Parsing {} bytes as {} with {}", input.len(), format, parser.name());
        parser.parse(input, options, registry)
    }

    /// Parse a file, choosing the parser from its extension.
    pub fn parse_file<P: AsRef<Path>>(
        &self,
        path: P,
        options: &ParseOptions,
        registry: &mut ResourceRegistry,
    ) -> Result<ParsedDocument> {
        let path = path.as_ref();
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                Error::UnsupportedFormat(format!("{} has no extension", path.display()))
            })?;

        if !self.supports(format) {
            return Err(Error::UnsupportedFormat(format.to_string()));
        }

        let input = std::fs::read(path)?;
        self.parse(format, &input, options, registry)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("formats", &self.supported_formats())
            .finish()
    }
}
