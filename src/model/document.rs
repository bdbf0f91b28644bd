//! Document-level types.

use super::{Block, BlockKind, ResourceRecord, Semantics, StructureItem};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The dual-layer document model exchanged between parsers and renderers.
///
/// The semantic layer (`blocks`, `structure`, `semantics`, `assets`) and the
/// styled layer (`markup_layer`) are produced together by a single
/// [`super::DocumentBuilder`] pass and are read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentModel {
    /// Document metadata (title, author, tags, ...)
    pub meta: Metadata,

    /// Ordered block sequence
    pub blocks: Vec<Block>,

    /// Navigation descriptors (headings, tables, lists, ...)
    pub structure: Vec<StructureItem>,

    /// Derived indices over `blocks`
    pub semantics: Semantics,

    /// Resource records referenced by this document, in order of first use
    pub assets: Vec<ResourceRecord>,

    /// Styled-content view with asset placeholders
    pub markup_layer: String,

    /// Prior-version descriptors (advisory)
    #[serde(default)]
    pub version_history: Vec<VersionEntry>,
}

impl DocumentModel {
    /// Document title, empty when none was declared or derived.
    pub fn title(&self) -> &str {
        self.meta.title()
    }

    /// Get the number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over heading blocks.
    pub fn headings(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.is_heading())
    }

    /// Iterate over blocks of the given kind.
    pub fn blocks_of(&self, kind: BlockKind) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(move |b| b.kind == kind)
    }

    /// Get an asset by record ID.
    pub fn get_asset(&self, id: &str) -> Option<&ResourceRecord> {
        self.assets.iter().find(|a| a.id == id)
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Serialize to the JSON wire form.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
    }

    /// Deserialize from the JSON wire form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Other(format!("Invalid document model: {}", e)))
    }

    /// Check structural completeness.
    ///
    /// Returns human readable problems; an empty list means the model is
    /// complete. This is advisory and never fails.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.meta.title().is_empty() {
            problems.push("Missing title in metadata".to_string());
        }
        if self.structure.is_empty() {
            problems.push("Missing structure".to_string());
        }
        if self.markup_layer.is_empty() {
            problems.push("Missing markup content".to_string());
        }
        problems
    }
}

/// Document metadata: a flat mapping of keys to scalar or array values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    entries: BTreeMap<String, MetaValue>,
}

impl Metadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key)
    }

    /// Get a string value by key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(MetaValue::as_str)
    }

    /// Insert a value. Returns false and keeps the old value if the key exists.
    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) -> bool {
        use std::collections::btree_map::Entry;
        match self.entries.entry(key.into()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Check if a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetaValue)> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Document title, empty when absent.
    pub fn title(&self) -> &str {
        self.get_str("title").unwrap_or("")
    }

    /// Tags as strings.
    pub fn tags(&self) -> Vec<String> {
        match self.entries.get("tags") {
            Some(MetaValue::List(items)) => items.iter().map(|v| v.to_string()).collect(),
            Some(MetaValue::String(s)) => s
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Convert metadata to a YAML front matter block.
    pub fn to_front_matter(&self) -> Result<String> {
        let yaml = serde_yaml::to_string(&self.entries)
            .map_err(|e| Error::Render(format!("YAML serialization error: {}", e)))?;
        let mut out = String::from("---\n");
        if !self.entries.is_empty() {
            out.push_str(&yaml);
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }
        out.push_str("---\n");
        Ok(out)
    }
}

impl FromIterator<(String, MetaValue)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (String, MetaValue)>>(iter: I) -> Self {
        let mut meta = Metadata::new();
        for (k, v) in iter {
            meta.insert(k, v);
        }
        meta
    }
}

/// A metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Integer(i64),
    /// Floating point
    Float(f64),
    /// String
    String(String),
    /// Array of values
    List(Vec<MetaValue>),
}

impl MetaValue {
    /// Get the string if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a YAML value. Nested mappings are kept as their YAML text.
    pub fn from_yaml(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;
        match value {
            Value::Null => MetaValue::Null,
            Value::Bool(b) => MetaValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    MetaValue::Integer(i)
                } else {
                    MetaValue::Float(n.as_f64().unwrap_or_default())
                }
            }
            Value::String(s) => MetaValue::String(s),
            Value::Sequence(items) => {
                MetaValue::List(items.into_iter().map(MetaValue::from_yaml).collect())
            }
            Value::Mapping(map) => {
                let text = serde_yaml::to_string(&map).unwrap_or_default();
                MetaValue::String(text.trim_end().to_string())
            }
            Value::Tagged(tagged) => MetaValue::from_yaml(tagged.value),
        }
    }
}

impl std::fmt::Display for MetaValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetaValue::Null => Ok(()),
            MetaValue::Bool(b) => write!(f, "{}", b),
            MetaValue::Integer(i) => write!(f, "{}", i),
            MetaValue::Float(x) => write!(f, "{}", x),
            MetaValue::String(s) => f.write_str(s),
            MetaValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::String(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        MetaValue::String(s)
    }
}

/// A prior-version descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// Version label
    pub version: String,

    /// When this version was recorded
    pub timestamp: DateTime<Utc>,

    /// Change summary
    pub changes: String,
}

impl VersionEntry {
    /// Create a version entry stamped now.
    pub fn new(version: impl Into<String>, changes: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            timestamp: Utc::now(),
            changes: changes.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_new() {
        let doc = DocumentModel::default();
        assert!(doc.is_empty());
        assert_eq!(doc.title(), "");
        assert_eq!(doc.validate().len(), 3);
    }

    #[test]
    fn test_metadata_insert_keeps_first_value() {
        let mut meta = Metadata::new();
        assert!(meta.insert("title", "First".into()));
        assert!(!meta.insert("title", "Second".into()));
        assert_eq!(meta.title(), "First");
    }

    #[test]
    fn test_metadata_front_matter() {
        let mut meta = Metadata::new();
        meta.insert("title", "Test Document".into());
        meta.insert("author", "Jane Roe".into());
        meta.insert(
            "tags",
            MetaValue::List(vec!["a".into(), "b".into()]),
        );

        let yaml = meta.to_front_matter().unwrap();
        assert!(yaml.starts_with("---\n"));
        assert!(yaml.ends_with("---\n"));
        assert!(yaml.contains("title: Test Document"));
        assert!(yaml.contains("author: Jane Roe"));
        assert_eq!(meta.tags(), vec!["a", "b"]);
    }

    #[test]
    fn test_meta_value_from_yaml() {
        let value: serde_yaml::Value = serde_yaml::from_str("[1, two, 3.5, true]").unwrap();
        let meta = MetaValue::from_yaml(value);
        assert_eq!(
            meta,
            MetaValue::List(vec![
                MetaValue::Integer(1),
                MetaValue::String("two".into()),
                MetaValue::Float(3.5),
                MetaValue::Bool(true),
            ])
        );
    }

    #[test]
    fn test_wire_form_field_names() {
        let doc = DocumentModel::default();
        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "meta",
            "blocks",
            "structure",
            "semantics",
            "assets",
            "markup_layer",
            "version_history",
        ] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
        assert_eq!(obj.len(), 7);
    }

    #[test]
    fn test_json_round_trip() {
        let mut doc = DocumentModel::default();
        doc.meta.insert("title", "Round".into());
        doc.blocks.push(Block::heading(1, "Round", 0));
        let back = DocumentModel::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(back, doc);
    }
}
