//! Asset extraction from scanned blocks.

use super::{normalize_locator, ResourceRegistry};
use crate::model::{Block, BlockKind, Diagnostic, DiagnosticKind, ResourceRecord};
use crate::render::markup::{inline_tokens, AssetRefs, Inline};
use std::collections::HashSet;

/// An image reference found in document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Normalized locator
    pub locator: String,
    /// Alternative text
    pub alt: String,
    /// Source line (0-based)
    pub line: usize,
    /// Registered resource ID, if the image was registered
    pub id: Option<String>,
}

/// Everything asset extraction produces for one document.
#[derive(Debug, Clone, Default)]
pub struct ExtractedAssets {
    /// Block and image replacements for the markup layer
    pub refs: AssetRefs,
    /// Image references in document order
    pub images: Vec<ImageRef>,
    /// Records referenced by the document, first occurrence first
    pub records: Vec<ResourceRecord>,
    /// Problems found while materializing assets
    pub diagnostics: Vec<Diagnostic>,
}

impl ExtractedAssets {
    /// Locate images without registering anything.
    pub fn references_only(blocks: &[Block]) -> Self {
        let images = blocks
            .iter()
            .filter(|b| !b.is_literal())
            .flat_map(|b| find_images(b).into_iter())
            .map(|(locator, alt, line)| ImageRef {
                locator,
                alt,
                line,
                id: None,
            })
            .collect();

        Self {
            images,
            ..Self::default()
        }
    }

    fn push_record(&mut self, record: ResourceRecord, seen: &mut HashSet<String>) -> bool {
        if seen.insert(record.id.clone()) {
            self.records.push(record);
            true
        } else {
            false
        }
    }
}

/// Register code blocks, diagram blocks and images with `registry`.
///
/// Every fenced or detected literal block yields exactly one record
/// reference, so a document with N code blocks references N code records
/// (fewer only when two blocks are byte-identical).
pub fn extract_assets(blocks: &[Block], registry: &mut ResourceRegistry) -> ExtractedAssets {
    let mut out = ExtractedAssets::default();
    let mut seen = HashSet::new();

    for (index, block) in blocks.iter().enumerate() {
        match block.kind {
            BlockKind::CodeBlock => {
                let record = registry.process_code(&block.content, block.language.as_deref());
                out.refs.insert_block(index, record.id.clone(), record.kind);
                out.push_record(record, &mut seen);
            }
            BlockKind::DiagramBlock => {
                let record =
                    registry.process_diagram_with_language(&block.content, block.language.as_deref());
                out.refs.insert_block(index, record.id.clone(), record.kind);
                out.push_record(record, &mut seen);
            }
            _ => {
                for (locator, alt, line) in find_images(block) {
                    let record = registry.process_image(&locator, &alt);
                    out.refs.insert_image(locator.clone(), record.id.clone());
                    out.images.push(ImageRef {
                        locator,
                        alt,
                        line,
                        id: Some(record.id.clone()),
                    });

                    let unavailable = is_unavailable(&record, registry);
                    let (id, source) = (record.id.clone(), record.source_locator.clone());
                    if out.push_record(record, &mut seen) && unavailable {
                        log::warn!("Image {} kept as reference only", id);
                        out.diagnostics.push(Diagnostic::new(
                            DiagnosticKind::AssetUnavailable,
                            line,
                            format!(
                                "image {} could not be copied: {}",
                                id,
                                source.unwrap_or_default()
                            ),
                        ));
                    }
                }
            }
        }
    }

    log::debug!(
        "Extracted {} resources ({} images)",
        out.records.len(),
        out.images.len()
    );
    out
}

/// A reference-only record is only a problem when a copy was wanted.
fn is_unavailable(record: &ResourceRecord, registry: &ResourceRegistry) -> bool {
    let config = registry.config();
    let inline_data = record
        .source_locator
        .as_deref()
        .is_some_and(|l| l.starts_with("data:"));
    record.is_reference_only()
        && config.asset_dir.is_some()
        && !inline_data
        && (!record.is_remote() || config.fetch_remote)
}

/// (normalized locator, alt, line) of each image in a non-literal block.
fn find_images(block: &Block) -> Vec<(String, String, usize)> {
    let mut found = Vec::new();
    for (offset, line) in block.content.lines().enumerate() {
        for token in inline_tokens(line) {
            if let Inline::Image { alt, src } = token {
                let locator = normalize_locator(src);
                if locator.is_empty() {
                    continue;
                }
                found.push((locator, alt.to_string(), block.source_line + offset));
            }
        }
    }
    found
}
