//! Rendering seam between the document model and output formats.
//!
//! Format-specific renderers implement [`DocumentRenderer`] and treat the
//! [`DocumentModel`] as read-only. The crate ships the JSON wire form and a
//! markup renderer that emits the model's styled layer.

mod json;
pub mod markup;
mod options;

pub use json::{to_json, JsonFormat, JsonRenderer};
pub use markup::{escape_html, placeholder, render_markup, AssetRefs};
pub use options::{MarkupOptions, RenderOptions};

use crate::error::Result;
use crate::model::DocumentModel;

/// Trait for renderers that turn a document model into output bytes.
pub trait DocumentRenderer: Send + Sync {
    /// Get the renderer name.
    fn name(&self) -> &str;

    /// Render the model.
    fn render(&self, doc: &DocumentModel, options: &RenderOptions) -> Result<Vec<u8>>;
}

/// Renderer emitting the stored markup layer, optionally preceded by the
/// metadata as YAML front matter.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupRenderer;

impl MarkupRenderer {
    /// Create a new markup renderer.
    pub fn new() -> Self {
        Self
    }
}

impl DocumentRenderer for MarkupRenderer {
    fn name(&self) -> &str {
        "markup"
    }

    fn render(&self, doc: &DocumentModel, options: &RenderOptions) -> Result<Vec<u8>> {
        let mut out = String::new();
        if options.include_frontmatter && !doc.meta.is_empty() {
            out.push_str(&doc.meta.to_front_matter()?);
            out.push('\n');
        }
        out.push_str(&doc.markup_layer);
        Ok(out.into_bytes())
    }
}
