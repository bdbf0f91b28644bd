//! Persisted registry state.

use crate::error::{Error, Result};
use crate::model::{ResourceKind, ResourceRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Serializable registry state used to resume ID and dedup state across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Records in creation order
    pub resources: Vec<ResourceRecord>,

    /// Next counter value per kind
    pub counters: BTreeMap<ResourceKind, u32>,

    /// Latest version-bumped copy of each record, by ID
    pub versions: BTreeMap<String, ResourceRecord>,

    /// Version stamped on new records
    pub current_version: String,

    /// When the snapshot was taken
    pub generated_at: DateTime<Utc>,
}

impl RegistrySnapshot {
    /// Read a snapshot from a JSON file.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data)
            .map_err(|e| Error::Snapshot(format!("{}: {}", path.display(), e)))
    }

    /// Write the snapshot as pretty JSON, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Snapshot(format!("serialization failed: {}", e)))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_use_kind_names() {
        let mut counters = BTreeMap::new();
        counters.insert(ResourceKind::Image, 3);
        counters.insert(ResourceKind::Diagram, 1);
        let snap = RegistrySnapshot {
            resources: Vec::new(),
            counters,
            versions: BTreeMap::new(),
            current_version: "1.0.0".into(),
            generated_at: Utc::now(),
        };
        let json: serde_json::Value = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["counters"]["image"], 3);
        assert_eq!(json["counters"]["diagram"], 1);
    }

    #[test]
    fn test_read_invalid_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(RegistrySnapshot::read(&path), Err(Error::Snapshot(_))));
    }
}
