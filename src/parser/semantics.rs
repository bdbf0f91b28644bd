//! Derived indices and navigation descriptors over the block sequence.

use crate::assets::ImageRef;
use crate::model::{
    Block, BlockKind, Metadata, SectionInfo, Semantics, StructureItem, StructureType, Table,
};

/// Table kind for `table_type`.
pub fn table_kind(block: &Block) -> &'static str {
    let table = Table::parse(&block.content);
    if !table.has_separator {
        "plain"
    } else if table.column_count() == 2 {
        "key_value"
    } else {
        "data"
    }
}

/// Build the semantic indices.
///
/// Headings get `sec-1`, `sec-2`, ... in document order; lists and tables get
/// `list-0`, `table-0`, ... regardless of nesting.
pub fn extract_semantics(blocks: &[Block], meta: &Metadata, domain_tag: Option<&str>) -> Semantics {
    let mut semantics = Semantics {
        domain_tag: resolve_domain_tag(meta, domain_tag),
        ..Semantics::default()
    };

    let mut sections = 0;
    let mut lists = 0;
    let mut tables = 0;

    for block in blocks {
        match block.kind {
            BlockKind::Heading => {
                sections += 1;
                semantics.section_id.insert(
                    format!("sec-{}", sections),
                    SectionInfo {
                        title: block.content.clone(),
                        level: block.level.unwrap_or(1),
                        position: block.source_line,
                    },
                );
            }
            BlockKind::List => {
                let kind = if block.ordered.unwrap_or(false) {
                    "ordered"
                } else {
                    "unordered"
                };
                semantics
                    .list_type
                    .insert(format!("list-{}", lists), kind.to_string());
                lists += 1;
            }
            BlockKind::Table => {
                semantics
                    .table_type
                    .insert(format!("table-{}", tables), table_kind(block).to_string());
                tables += 1;
            }
            _ => {}
        }
    }

    semantics
}

fn resolve_domain_tag(meta: &Metadata, domain_tag: Option<&str>) -> String {
    domain_tag
        .filter(|t| !t.is_empty())
        .or_else(|| meta.get_str("domain"))
        .or_else(|| meta.get_str("mode"))
        .unwrap_or("")
        .to_string()
}

/// Build navigation descriptors ordered by source position.
pub fn structure_items(blocks: &[Block], images: &[ImageRef]) -> Vec<StructureItem> {
    let mut items: Vec<StructureItem> = blocks
        .iter()
        .filter_map(|block| match block.kind {
            BlockKind::Heading => Some(StructureItem::heading(
                block.level.unwrap_or(1),
                block.content.clone(),
                block.source_line,
            )),
            BlockKind::List => Some(StructureItem::new(StructureType::List, block.source_line)),
            BlockKind::Table => Some(StructureItem::new(StructureType::Table, block.source_line)),
            BlockKind::CodeBlock => Some(
                StructureItem::new(StructureType::CodeBlock, block.source_line)
                    .with_title(block.language.clone().unwrap_or_default()),
            ),
            BlockKind::DiagramBlock => Some(
                StructureItem::new(StructureType::Diagram, block.source_line)
                    .with_title(block.language.clone().unwrap_or_default()),
            ),
            BlockKind::Paragraph => None,
        })
        .collect();

    items.extend(
        images
            .iter()
            .map(|img| StructureItem::new(StructureType::Image, img.line).with_title(img.alt.clone())),
    );

    // Stable: a block descriptor stays ahead of images on its first line.
    items.sort_by_key(|item| item.position);
    items
}
