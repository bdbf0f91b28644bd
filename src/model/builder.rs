//! Accumulate-then-freeze assembler for [`DocumentModel`].

use super::{
    Block, BlockKind, DocumentModel, MetaValue, Metadata, ResourceRecord, SectionInfo,
    StructureItem, VersionEntry,
};
use crate::error::{Error, Result};
use crate::render::markup::placeholder_ids;
use std::collections::HashSet;

/// Append-only builder for a [`DocumentModel`].
///
/// Nothing can be removed or overwritten once added. [`DocumentBuilder::build`]
/// checks that the styled layer and the semantic indices agree with the
/// block sequence and the asset list before handing out the model.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    model: DocumentModel,
    asset_ids: HashSet<String>,
}

impl DocumentBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every entry of `meta` whose key is not yet present.
    pub fn extend_meta(&mut self, meta: Metadata) -> &mut Self {
        for (key, value) in meta.iter() {
            self.model.meta.insert(key.clone(), value.clone());
        }
        self
    }

    /// Add a single metadata entry unless the key is already present.
    pub fn insert_meta(&mut self, key: impl Into<String>, value: MetaValue) -> bool {
        self.model.meta.insert(key, value)
    }

    /// Append a block. Source lines must be non-decreasing.
    pub fn add_block(&mut self, block: Block) -> Result<&mut Self> {
        if let Some(last) = self.model.blocks.last() {
            if block.source_line < last.source_line {
                return Err(Error::ModelSync(format!(
                    "block at line {} follows block at line {}",
                    block.source_line, last.source_line
                )));
            }
        }
        self.model.blocks.push(block);
        Ok(self)
    }

    /// Append a navigation descriptor.
    pub fn add_structure_item(&mut self, item: StructureItem) -> &mut Self {
        self.model.structure.push(item);
        self
    }

    /// Append an asset record. Returns false if a record with this ID is
    /// already present.
    pub fn add_asset(&mut self, record: ResourceRecord) -> bool {
        if !self.asset_ids.insert(record.id.clone()) {
            return false;
        }
        self.model.assets.push(record);
        true
    }

    /// Index a section. Returns false if the ID is taken.
    pub fn add_section(&mut self, id: impl Into<String>, info: SectionInfo) -> bool {
        insert_new(&mut self.model.semantics.section_id, id.into(), info)
    }

    /// Index a list kind. Returns false if the ID is taken.
    pub fn add_list_type(&mut self, id: impl Into<String>, kind: impl Into<String>) -> bool {
        insert_new(&mut self.model.semantics.list_type, id.into(), kind.into())
    }

    /// Index a table kind. Returns false if the ID is taken.
    pub fn add_table_type(&mut self, id: impl Into<String>, kind: impl Into<String>) -> bool {
        insert_new(&mut self.model.semantics.table_type, id.into(), kind.into())
    }

    /// Set the domain tag. Only the first non-empty value is kept.
    pub fn set_domain_tag(&mut self, tag: impl Into<String>) -> bool {
        if !self.model.semantics.domain_tag.is_empty() {
            return false;
        }
        self.model.semantics.domain_tag = tag.into();
        true
    }

    /// Append to the styled layer.
    pub fn push_markup(&mut self, markup: &str) -> &mut Self {
        self.model.markup_layer.push_str(markup);
        self
    }

    /// Append a version history entry.
    pub fn add_version_entry(&mut self, entry: VersionEntry) -> &mut Self {
        self.model.version_history.push(entry);
        self
    }

    /// Number of blocks added so far.
    pub fn block_count(&self) -> usize {
        self.model.blocks.len()
    }

    /// Freeze the model after checking the synchronization invariant.
    pub fn build(self) -> Result<DocumentModel> {
        self.check_sync()?;
        Ok(self.model)
    }

    fn check_sync(&self) -> Result<()> {
        let model = &self.model;

        for id in placeholder_ids(&model.markup_layer) {
            if !self.asset_ids.contains(&id) {
                return Err(Error::ModelSync(format!(
                    "placeholder {} has no matching asset",
                    id
                )));
            }
        }

        let heading_lines: HashSet<usize> = model
            .blocks
            .iter()
            .filter(|b| b.is_heading())
            .map(|b| b.source_line)
            .collect();
        for (id, info) in &model.semantics.section_id {
            if !heading_lines.contains(&info.position) {
                return Err(Error::ModelSync(format!(
                    "{} points at line {} which is not a heading",
                    id, info.position
                )));
            }
        }

        let count = |kind: BlockKind| model.blocks.iter().filter(|b| b.kind == kind).count();
        check_indexed_keys(model.semantics.list_type.keys(), "list-", count(BlockKind::List))?;
        check_indexed_keys(
            model.semantics.table_type.keys(),
            "table-",
            count(BlockKind::Table),
        )?;

        Ok(())
    }
}

fn insert_new<V>(map: &mut std::collections::BTreeMap<String, V>, key: String, value: V) -> bool {
    if map.contains_key(&key) {
        return false;
    }
    map.insert(key, value);
    true
}

fn check_indexed_keys<'a>(
    keys: impl Iterator<Item = &'a String>,
    prefix: &str,
    available: usize,
) -> Result<()> {
    for key in keys {
        let index = key
            .strip_prefix(prefix)
            .and_then(|n| n.parse::<usize>().ok())
            .ok_or_else(|| Error::ModelSync(format!("malformed semantics key {}", key)))?;
        if index >= available {
            return Err(Error::ModelSync(format!(
                "{} has no matching block ({} available)",
                key, available
            )));
        }
    }
    Ok(())
}
