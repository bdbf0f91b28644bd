//! Navigation descriptors and derived semantic indices.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A lightweight navigation descriptor.
///
/// `position` indexes into the original line stream, not into `blocks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureItem {
    /// Descriptor type
    #[serde(rename = "type")]
    pub item_type: StructureType,

    /// Heading level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,

    /// Heading text or image alt text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// 0-based line in the original input
    pub position: usize,
}

impl StructureItem {
    /// Create a descriptor of the given type.
    pub fn new(item_type: StructureType, position: usize) -> Self {
        Self {
            item_type,
            level: None,
            title: None,
            position,
        }
    }

    /// Create a heading descriptor.
    pub fn heading(level: u8, title: impl Into<String>, position: usize) -> Self {
        Self {
            item_type: StructureType::Heading,
            level: Some(level),
            title: Some(title.into()),
            position,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        if !title.is_empty() {
            self.title = Some(title);
        }
        self
    }
}

/// Type of a structure descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureType {
    Heading,
    List,
    Table,
    CodeBlock,
    Diagram,
    Image,
}

/// Heading info indexed by section ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionInfo {
    pub title: String,
    pub level: u8,
    pub position: usize,
}

/// Derived indices over the block sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semantics {
    /// Domain classification (from options or metadata), may be empty
    pub domain_tag: String,

    /// `sec-N` → heading info
    pub section_id: BTreeMap<String, SectionInfo>,

    /// `table-N` → table kind (`data`, `key_value`, `plain`)
    pub table_type: BTreeMap<String, String>,

    /// `list-N` → ordering kind (`ordered`, `unordered`)
    pub list_type: BTreeMap<String, String>,
}

impl Semantics {
    /// Number of indexed sections.
    pub fn section_count(&self) -> usize {
        self.section_id.len()
    }

    /// Section IDs in document order.
    ///
    /// Keys sort lexically in the map, so `sec-10` would precede `sec-2`;
    /// this orders by position instead.
    pub fn sections_in_order(&self) -> Vec<(&String, &SectionInfo)> {
        let mut sections: Vec<_> = self.section_id.iter().collect();
        sections.sort_by_key(|(_, info)| info.position);
        sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_item_serialization() {
        let item = StructureItem::heading(2, "Setup", 7);
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(
            json,
            r#"{"type":"heading","level":2,"title":"Setup","position":7}"#
        );

        let item = StructureItem::new(StructureType::CodeBlock, 3).with_title("");
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"type":"code_block","position":3}"#);
    }

    #[test]
    fn test_sections_in_order() {
        let mut sem = Semantics::default();
        for (i, pos) in [(1, 0), (2, 5), (10, 90)] {
            sem.section_id.insert(
                format!("sec-{}", i),
                SectionInfo {
                    title: format!("S{}", i),
                    level: 1,
                    position: pos,
                },
            );
        }
        let order: Vec<&str> = sem
            .sections_in_order()
            .into_iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(order, vec!["sec-1", "sec-2", "sec-10"]);
    }
}
