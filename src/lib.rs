//! # docbridge
//!
//! Structural parsing of line-oriented markup into a shared document model.
//!
//! Every input format is parsed into the same [`DocumentModel`]: an ordered
//! sequence of typed blocks, a structure index, semantic tags, deduplicated
//! resource records and a styled markup layer in which extracted assets are
//! replaced by placeholders. Renderers consume that model uniformly.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docbridge::{parse_file, render::JsonFormat};
//!
//! fn main() -> docbridge::Result<()> {
//!     let parsed = parse_file("notes.md")?;
//!     for diagnostic in &parsed.diagnostics {
//!         eprintln!("{}", diagnostic);
//!     }
//!     println!("{}", docbridge::render::to_json(&parsed.model, JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Block scanning**: headings, paragraphs, nested lists, tables, code fences
//! - **Diagram detection**: fenced diagram languages and prose diagram heuristics
//! - **Front matter**: YAML metadata with heuristic fallback
//! - **Resource registry**: content-addressed IDs, dedup, managed asset directory
//! - **Quality checks**: rule-based findings with a document score

pub mod assets;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod quality;
pub mod render;

// Re-export commonly used types
pub use assets::{RegistryConfig, ResourceRegistry};
pub use detect::{detect_format_from_bytes, detect_format_from_path};
pub use error::{Error, Result};
pub use model::{
    Block, BlockKind, Diagnostic, DiagnosticKind, DocumentModel, MetaValue, Metadata,
    ResourceKind, ResourceRecord, Semantics, Severity, StructureItem,
};
pub use parser::{DocumentParser, ParseOptions, ParsedDocument, ParserRegistry};
pub use quality::{QualityChecker, QualityReport};
pub use render::{DocumentRenderer, JsonFormat, MarkupOptions, RenderOptions};

use std::path::{Path, PathBuf};

/// Parse text in the given format with default options and an in-memory
/// resource registry.
///
/// # Example
///
/// ```
/// let parsed = docbridge::parse_str("# Title\n\nBody\n", "md").unwrap();
/// assert_eq!(parsed.model.title(), "Title");
/// ```
pub fn parse_str(text: &str, format: &str) -> Result<ParsedDocument> {
    parse_bytes(text.as_bytes(), format)
}

/// Parse raw bytes in the given format.
pub fn parse_bytes(data: &[u8], format: &str) -> Result<ParsedDocument> {
    DocBridge::new().parse_bytes(data, format)
}

/// Parse a file, detecting its format from the extension or content.
///
/// # Example
///
/// ```no_run
/// let parsed = docbridge::parse_file("README.md").unwrap();
/// println!("{} blocks", parsed.model.block_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ParsedDocument> {
    DocBridge::new().parse_file(path)
}

/// Builder tying parsers, options and a resource registry together.
///
/// The registry lives as long as the builder, so resources seen in one
/// document keep their IDs in the next.
///
/// # Example
///
/// ```no_run
/// use docbridge::DocBridge;
///
/// let mut bridge = DocBridge::new()
///     .with_asset_dir("./assets")
///     .with_domain_tag("technical");
/// let first = bridge.parse_file("intro.md")?;
/// let second = bridge.parse_file("guide.md")?;
/// bridge.save_snapshot("./assets/registry.json")?;
/// # Ok::<(), docbridge::Error>(())
/// ```
pub struct DocBridge {
    parsers: ParserRegistry,
    resources: ResourceRegistry,
    /// Base directory fixed by the caller; otherwise each file's parent
    source_dir: Option<PathBuf>,
    parse_options: ParseOptions,
    render_options: RenderOptions,
}

impl DocBridge {
    /// Create a builder with the built-in parsers and an in-memory registry.
    pub fn new() -> Self {
        Self {
            parsers: ParserRegistry::with_defaults(),
            resources: ResourceRegistry::in_memory(),
            source_dir: None,
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Copy assets into a managed directory.
    pub fn with_asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resources.set_asset_dir(dir);
        self
    }

    /// Resolve relative locators against `dir` for every parsed file.
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.resources.set_source_dir(dir.clone());
        self.source_dir = Some(dir);
        self
    }

    /// Replace the resource registry. A source directory in its config
    /// applies to every parsed file.
    pub fn with_registry(mut self, registry: ResourceRegistry) -> Self {
        self.source_dir = registry.config().source_dir.clone();
        self.resources = registry;
        self
    }

    /// Register an additional parser.
    pub fn with_parser(mut self, parser: std::sync::Arc<dyn DocumentParser>) -> Self {
        self.parsers.register(parser);
        self
    }

    /// Set parse options.
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// Override the semantic domain tag.
    pub fn with_domain_tag(mut self, tag: impl Into<String>) -> Self {
        self.parse_options = self.parse_options.with_domain_tag(tag);
        self
    }

    /// Enable or disable asset extraction.
    pub fn with_assets(mut self, extract: bool) -> Self {
        self.parse_options = self.parse_options.with_assets(extract);
        self
    }

    /// Set render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Parse a file. Relative image paths resolve against its directory
    /// unless a source directory was configured.
    pub fn parse_file<P: AsRef<Path>>(&mut self, path: P) -> Result<ParsedDocument> {
        let path = path.as_ref();
        let format = detect_format_from_path(path)?;
        let data = std::fs::read(path)?;

        let base = match &self.source_dir {
            Some(dir) => dir.clone(),
            None => match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        };
        self.resources.set_source_dir(base);

        log::debug!("Parsing {} as {}", path.display(), format);
        self.parse_bytes(&data, format)
    }

    /// Parse raw bytes in the given format.
    pub fn parse_bytes(&mut self, data: &[u8], format: &str) -> Result<ParsedDocument> {
        self.parsers
            .parse(format, data, &self.parse_options, &mut self.resources)
    }

    /// Render a model with a renderer and the configured render options.
    pub fn render(&self, renderer: &dyn DocumentRenderer, doc: &DocumentModel) -> Result<Vec<u8>> {
        renderer.render(doc, &self.render_options)
    }

    /// Run the built-in quality rules.
    pub fn check(&self, parsed: &ParsedDocument) -> QualityReport {
        QualityChecker::new().check(parsed)
    }

    /// The resource registry.
    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// Save the registry state.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        self.resources.save_snapshot(path)
    }

    /// Load registry state saved by an earlier run. Returns `false` if the
    /// file does not exist.
    pub fn load_snapshot(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        self.resources.load_snapshot(path)
    }

    /// Consume the builder and return its registry.
    pub fn into_resources(self) -> ResourceRegistry {
        self.resources
    }
}

impl Default for DocBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_str_markdown() {
        let parsed = parse_str("# Hello\n\nWorld\n", "md").unwrap();
        assert_eq!(parsed.model.title(), "Hello");
        assert_eq!(parsed.model.block_count(), 2);
    }

    #[test]
    fn test_parse_str_unknown_format() {
        let result = parse_str("x", "docx");
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_builder_shares_registry_across_documents() {
        let mut bridge = DocBridge::new();
        let a = bridge.parse_bytes(b"```rust\nfn a() {}\n```\n", "md").unwrap();
        let b = bridge
            .parse_bytes(b"# B\n\n```rust\nfn a() {}\n```\n", "markdown")
            .unwrap();
        assert_eq!(a.model.assets[0].id, "code_000");
        assert_eq!(b.model.assets[0].id, "code_000");
        assert_eq!(bridge.resources().len(), 1);
    }

    #[test]
    fn test_builder_options() {
        let mut bridge = DocBridge::new().with_domain_tag("legal").with_assets(false);
        let parsed = bridge.parse_bytes(b"```\nx\n```\n", "md").unwrap();
        assert_eq!(parsed.model.semantics.domain_tag, "legal");
        assert!(parsed.model.assets.is_empty());
        assert!(bridge.resources().is_empty());
    }

    #[test]
    fn test_builder_render_and_check() {
        let mut bridge =
            DocBridge::new().with_render_options(RenderOptions::new().with_json_format(JsonFormat::Compact));
        let parsed = bridge.parse_bytes(b"# A\n\n### C\n", "md").unwrap();
        let json = bridge
            .render(&render::JsonRenderer::new(), &parsed.model)
            .unwrap();
        assert!(!json.contains(&b'\n'));
        assert_eq!(bridge.check(&parsed).statistics.total_findings, 1);
    }

    #[test]
    fn test_parse_file_detects_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("NOTES");
        std::fs::write(&path, "---\ntitle: Notes\n---\nBody\n").unwrap();
        let parsed = parse_file(&path).unwrap();
        assert_eq!(parsed.model.title(), "Notes");
    }

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\nrest";

    #[test]
    fn test_parse_file_resolves_images_next_to_each_file() {
        let dir = tempfile::tempdir().unwrap();
        for (sub, doc, image) in [("a", "x.md", "one.png"), ("b", "y.md", "two.png")] {
            std::fs::create_dir_all(dir.path().join(sub)).unwrap();
            std::fs::write(dir.path().join(sub).join(image), PNG).unwrap();
            std::fs::write(
                dir.path().join(sub).join(doc),
                format!("![pic]({})\n", image),
            )
            .unwrap();
        }

        let mut bridge = DocBridge::new().with_asset_dir(dir.path().join("assets"));
        for doc in ["a/x.md", "b/y.md"] {
            let parsed = bridge.parse_file(dir.path().join(doc)).unwrap();
            assert!(parsed.model.assets[0].local_path.is_some(), "{}", doc);
            assert!(!parsed.has_diagnostic(DiagnosticKind::AssetUnavailable), "{}", doc);
        }
        assert_eq!(bridge.resources().len(), 2);
    }

    #[test]
    fn test_configured_source_dir_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("shared")).unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("shared/logo.png"), PNG).unwrap();
        std::fs::write(dir.path().join("docs/page.md"), "![logo](logo.png)\n").unwrap();

        let mut bridge = DocBridge::new()
            .with_asset_dir(dir.path().join("assets"))
            .with_source_dir(dir.path().join("shared"));
        let parsed = bridge.parse_file(dir.path().join("docs/page.md")).unwrap();
        assert!(parsed.model.assets[0].local_path.is_some());
    }

    struct CountingFetcher(std::sync::Arc<std::sync::atomic::AtomicUsize>);

    impl assets::Fetch for CountingFetcher {
        fn fetch(&self, _url: &str, _timeout: std::time::Duration) -> Result<Vec<u8>> {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(PNG.to_vec())
        }
    }

    #[test]
    fn test_asset_dir_keeps_injected_fetcher() {
        let dir = tempfile::tempdir().unwrap();
        let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let registry =
            ResourceRegistry::in_memory().with_fetcher(Box::new(CountingFetcher(calls.clone())));

        let mut bridge = DocBridge::new()
            .with_registry(registry)
            .with_asset_dir(dir.path().join("assets"));
        let parsed = bridge
            .parse_bytes(b"![remote](https://cdn.example.com/a.png)\n", "md")
            .unwrap();

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert!(parsed.model.assets[0].local_path.is_some());
    }
}
