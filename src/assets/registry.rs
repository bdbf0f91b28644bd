//! Deduplicating resource registry.

use super::fetch::{default_fetcher, Fetch};
use super::snapshot::RegistrySnapshot;
use crate::error::{Error, Result};
use crate::model::{is_remote_locator, ResourceKind, ResourceRecord};
use chrono::Utc;
use md5::{Digest, Md5};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg", "bmp", "tiff", "ico"];
const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "woff", "woff2"];

/// Registry configuration.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Managed asset directory; `None` keeps the registry purely in memory
    pub asset_dir: Option<PathBuf>,

    /// Base directory for relative locators
    pub source_dir: Option<PathBuf>,

    /// Fetch remote locators into the asset directory
    pub fetch_remote: bool,

    /// Per-resource fetch timeout
    pub fetch_timeout: Duration,

    /// Version stamped on new records
    pub current_version: String,
}

impl RegistryConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the managed asset directory.
    pub fn with_asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = Some(dir.into());
        self
    }

    /// Set the base directory for relative locators.
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = Some(dir.into());
        self
    }

    /// Enable or disable remote fetching.
    pub fn with_fetch_remote(mut self, fetch: bool) -> Self {
        self.fetch_remote = fetch;
        self
    }

    /// Set the fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the version stamped on new records.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.current_version = version.into();
        self
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            asset_dir: None,
            source_dir: None,
            fetch_remote: true,
            fetch_timeout: Duration::from_secs(10),
            current_version: "1.0.0".to_string(),
        }
    }
}

/// Registry of extracted resources.
///
/// Each content signature maps to exactly one [`ResourceRecord`]. IDs come
/// from per-kind counters that only ever increase, so an ID is never handed
/// out twice, even across [`ResourceRegistry::restore`].
///
/// A registry is not synchronized. Give each concurrent parse its own
/// instance or guard a shared one with a mutex.
pub struct ResourceRegistry {
    config: RegistryConfig,
    resources: Vec<ResourceRecord>,
    by_hash: HashMap<String, usize>,
    by_id: HashMap<String, usize>,
    counters: BTreeMap<ResourceKind, u32>,
    versions: BTreeMap<String, ResourceRecord>,
    fetcher: Box<dyn Fetch>,
}

impl ResourceRegistry {
    /// Create a registry with the given configuration.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            resources: Vec::new(),
            by_hash: HashMap::new(),
            by_id: HashMap::new(),
            counters: BTreeMap::new(),
            versions: BTreeMap::new(),
            fetcher: default_fetcher(),
        }
    }

    /// Create a registry that performs no I/O.
    pub fn in_memory() -> Self {
        Self::new(RegistryConfig::default())
    }

    /// Create a registry managing `asset_dir`.
    pub fn with_asset_dir(asset_dir: impl Into<PathBuf>) -> Self {
        Self::new(RegistryConfig::default().with_asset_dir(asset_dir))
    }

    /// Replace the fetcher used for remote locators.
    pub fn with_fetcher(mut self, fetcher: Box<dyn Fetch>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register an image by locator.
    pub fn process_image(&mut self, locator: &str, alt: &str) -> ResourceRecord {
        self.process_locator(ResourceKind::Image, locator, alt)
    }

    /// Register a font by locator.
    pub fn process_font(&mut self, locator: &str, name: &str) -> ResourceRecord {
        self.process_locator(ResourceKind::Font, locator, name)
    }

    /// Register any other file by locator.
    pub fn process_other(&mut self, locator: &str, label: &str) -> ResourceRecord {
        self.process_locator(ResourceKind::Other, locator, label)
    }

    /// Register a code snippet.
    pub fn process_code(&mut self, content: &str, language: Option<&str>) -> ResourceRecord {
        self.process_inline(ResourceKind::Code, content, language)
    }

    /// Register diagram source. The language is guessed from the content.
    pub fn process_diagram(&mut self, content: &str) -> ResourceRecord {
        self.process_diagram_with_language(content, None)
    }

    /// Register diagram source with an explicit language tag.
    pub fn process_diagram_with_language(
        &mut self,
        content: &str,
        language: Option<&str>,
    ) -> ResourceRecord {
        let language = language
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| crate::parser::diagram::detect_language(content));
        self.process_inline(ResourceKind::Diagram, content, Some(language))
    }

    /// Get a record by ID.
    pub fn get(&self, id: &str) -> Option<&ResourceRecord> {
        self.by_id.get(id).map(|&i| &self.resources[i])
    }

    /// Get a record by content signature.
    pub fn get_by_hash(&self, hash: &str) -> Option<&ResourceRecord> {
        self.by_hash.get(hash).map(|&i| &self.resources[i])
    }

    /// Iterate over records of one kind, in creation order.
    pub fn by_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &ResourceRecord> {
        self.resources.iter().filter(move |r| r.kind == kind)
    }

    /// All records, in creation order.
    pub fn records(&self) -> &[ResourceRecord] {
        &self.resources
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Version stamped on new records.
    pub fn current_version(&self) -> &str {
        &self.config.current_version
    }

    /// Change the version stamped on new records.
    pub fn set_current_version(&mut self, version: impl Into<String>) {
        self.config.current_version = version.into();
    }

    /// Change the base directory for relative locators.
    pub fn set_source_dir(&mut self, dir: impl Into<PathBuf>) {
        self.config.source_dir = Some(dir.into());
    }

    /// Change the managed asset directory. Existing records keep their paths.
    pub fn set_asset_dir(&mut self, dir: impl Into<PathBuf>) {
        self.config.asset_dir = Some(dir.into());
    }

    /// Bump the version of one record. Returns false for an unknown ID.
    pub fn update_version(&mut self, id: &str, version: &str) -> bool {
        let Some(&index) = self.by_id.get(id) else {
            return false;
        };
        let record = &mut self.resources[index];
        record.version = version.to_string();
        record.updated_at = Some(Utc::now());
        self.versions.insert(id.to_string(), record.clone());
        log::debug!("Resource {} bumped to version {}", id, version);
        true
    }

    /// Report records not named in `referenced`.
    ///
    /// Advisory only: nothing is removed and counters are untouched.
    pub fn cleanup_unused<I, S>(&self, referenced: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let referenced: std::collections::HashSet<String> = referenced
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        let unused: Vec<String> = self
            .resources
            .iter()
            .filter(|r| !referenced.contains(&r.id))
            .map(|r| r.id.clone())
            .collect();
        if !unused.is_empty() {
            log::info!("{} unreferenced resources", unused.len());
        }
        unused
    }

    /// Capture the current state.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            resources: self.resources.clone(),
            counters: self.counters.clone(),
            versions: self.versions.clone(),
            current_version: self.config.current_version.clone(),
            generated_at: Utc::now(),
        }
    }

    /// Merge a snapshot into this registry.
    ///
    /// Records whose ID or signature is already known are skipped. Counters
    /// take the larger of both sides and never fall below any restored ID.
    /// No referential check against any document is made.
    pub fn restore(&mut self, snapshot: RegistrySnapshot) {
        for record in snapshot.resources {
            if let Some(n) = id_number(&record.id, record.kind) {
                let counter = self.counters.entry(record.kind).or_insert(0);
                *counter = (*counter).max(n + 1);
            }
            if self.by_id.contains_key(&record.id) || self.by_hash.contains_key(&record.content_hash)
            {
                continue;
            }
            self.insert(record);
        }
        for (kind, value) in snapshot.counters {
            let counter = self.counters.entry(kind).or_insert(0);
            *counter = (*counter).max(value);
        }
        self.versions.extend(snapshot.versions);
        self.config.current_version = snapshot.current_version;
    }

    /// Write a snapshot to `path`.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        self.snapshot().write(path.as_ref())
    }

    /// Load a snapshot from `path`. Returns `Ok(false)` when the file does
    /// not exist.
    pub fn load_snapshot(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(false);
        }
        let snapshot = RegistrySnapshot::read(path)?;
        log::debug!(
            "Restoring {} resources from {}",
            snapshot.resources.len(),
            path.display()
        );
        self.restore(snapshot);
        Ok(true)
    }

    fn process_locator(&mut self, kind: ResourceKind, locator: &str, label: &str) -> ResourceRecord {
        let normalized = normalize_locator(locator);
        let hash = content_signature(kind, &[normalized.as_bytes()]);
        if let Some(existing) = self.get_by_hash(&hash) {
            log::trace!("Dedup hit for {} {}", kind, normalized);
            return existing.clone();
        }

        let id = self.next_id(kind);
        let mut record = ResourceRecord::new(id, kind, hash, self.config.current_version.clone())
            .with_locator(normalized.clone())
            .with_label(label);
        record.local_path = self.materialize_locator(&record.id, kind, &normalized);
        self.insert(record)
    }

    fn process_inline(
        &mut self,
        kind: ResourceKind,
        content: &str,
        language: Option<&str>,
    ) -> ResourceRecord {
        let language = language.filter(|l| !l.is_empty());
        let hash = content_signature(
            kind,
            &[content.as_bytes(), language.unwrap_or("").as_bytes()],
        );
        if let Some(existing) = self.get_by_hash(&hash) {
            log::trace!("Dedup hit for {} ({} bytes)", kind, content.len());
            return existing.clone();
        }

        let id = self.next_id(kind);
        let mut record = ResourceRecord::new(id, kind, hash, self.config.current_version.clone())
            .with_inline_content(content)
            .with_language(language.map(str::to_string));
        let ext = match kind {
            ResourceKind::Diagram => diagram_extension(language),
            _ => code_extension(language),
        };
        record.local_path = self.write_inline(&record.id, kind, content, ext);
        self.insert(record)
    }

    fn next_id(&mut self, kind: ResourceKind) -> String {
        let counter = self.counters.entry(kind).or_insert(0);
        let id = format!("{}_{:03}", kind.id_prefix(), *counter);
        *counter += 1;
        id
    }

    fn insert(&mut self, record: ResourceRecord) -> ResourceRecord {
        let index = self.resources.len();
        self.by_hash.insert(record.content_hash.clone(), index);
        self.by_id.insert(record.id.clone(), index);
        self.resources.push(record.clone());
        record
    }

    fn kind_dir(&self, kind: ResourceKind) -> Option<PathBuf> {
        self.config
            .asset_dir
            .as_ref()
            .map(|dir| dir.join(kind.dir_name()))
    }

    fn materialize_locator(&self, id: &str, kind: ResourceKind, locator: &str) -> Option<PathBuf> {
        let dir = self.kind_dir(kind)?;
        let result = if is_remote_locator(locator) {
            if !self.config.fetch_remote {
                log::debug!("Remote fetching disabled, keeping reference to {}", locator);
                return None;
            }
            self.fetch_remote(&dir, id, kind, locator)
        } else if locator.starts_with("data:") {
            log::debug!("Inline data URI kept as reference");
            return None;
        } else {
            self.copy_local(&dir, id, kind, locator)
        };

        match result {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Resource {} unavailable ({}), keeping reference only", locator, e);
                None
            }
        }
    }

    fn fetch_remote(&self, dir: &Path, id: &str, kind: ResourceKind, url: &str) -> Result<PathBuf> {
        let data = self.fetcher.fetch(url, self.config.fetch_timeout)?;
        let url_path = url.split(['?', '#']).next().unwrap_or(url);
        let ext = extension_for(kind, Path::new(url_path), &data);
        let target = dir.join(format!("{}.{}", id, ext));
        std::fs::create_dir_all(dir)?;
        std::fs::write(&target, &data)?;
        Ok(target)
    }

    fn copy_local(&self, dir: &Path, id: &str, kind: ResourceKind, locator: &str) -> Result<PathBuf> {
        let locator = locator.strip_prefix("file://").unwrap_or(locator);
        let source = match &self.config.source_dir {
            Some(base) if Path::new(locator).is_relative() => base.join(locator),
            _ => PathBuf::from(locator),
        };
        if !source.is_file() {
            return Err(Error::ResourceNotFound(source.display().to_string()));
        }

        let mut head = [0u8; 16];
        let read = std::fs::File::open(&source)
            .and_then(|mut f| std::io::Read::read(&mut f, &mut head))
            .unwrap_or(0);
        let ext = extension_for(kind, &source, &head[..read]);
        let target = dir.join(format!("{}.{}", id, ext));
        std::fs::create_dir_all(dir)?;
        std::fs::copy(&source, &target)?;
        Ok(target)
    }

    fn write_inline(&self, id: &str, kind: ResourceKind, content: &str, ext: &str) -> Option<PathBuf> {
        let dir = self.kind_dir(kind)?;
        let target = dir.join(format!("{}.{}", id, ext));
        let result = std::fs::create_dir_all(&dir).and_then(|_| std::fs::write(&target, content));
        match result {
            Ok(()) => Some(target),
            Err(e) => {
                log::warn!("Could not write {} ({}), keeping inline content only", target.display(), e);
                None
            }
        }
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("config", &self.config)
            .field("resources", &self.resources.len())
            .field("counters", &self.counters)
            .finish()
    }
}

/// Normalize a locator: trim, unwrap `<...>`, drop a quoted title and a
/// leading `./`.
pub fn normalize_locator(locator: &str) -> String {
    let mut s = locator.trim();
    if let Some(inner) = s.strip_prefix('<').and_then(|r| r.split_once('>')) {
        s = inner.0.trim();
    } else if let Some(idx) = s.find([' ', '\t']) {
        let rest = s[idx..].trim_start();
        if rest.starts_with('"') || rest.starts_with('\'') || rest.starts_with('(') {
            s = s[..idx].trim_end();
        }
    }
    s.strip_prefix("./").unwrap_or(s).to_string()
}

/// Hex MD5 over the kind name and the given parts, NUL-separated.
pub fn content_signature(kind: ResourceKind, parts: &[&[u8]]) -> String {
    let mut hasher = Md5::new();
    hasher.update(kind.id_prefix().as_bytes());
    for part in parts {
        hasher.update([0u8]);
        hasher.update(part);
    }
    format!("{:x}", hasher.finalize())
}

fn id_number(id: &str, kind: ResourceKind) -> Option<u32> {
    id.strip_prefix(kind.id_prefix())?
        .strip_prefix('_')?
        .parse()
        .ok()
}

fn extension_for(kind: ResourceKind, source: &Path, head: &[u8]) -> String {
    let from_path = source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let from_magic = ResourceRecord::detect_mime_type(head).map(ResourceRecord::extension_for_mime);

    match kind {
        ResourceKind::Image => from_path
            .filter(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
            .or_else(|| from_magic.map(str::to_string))
            .unwrap_or_else(|| "png".to_string()),
        ResourceKind::Font => from_path
            .filter(|e| FONT_EXTENSIONS.contains(&e.as_str()))
            .or_else(|| from_magic.map(str::to_string))
            .unwrap_or_else(|| "bin".to_string()),
        _ => from_path.unwrap_or_else(|| "bin".to_string()),
    }
}

/// File extension for a code language tag.
pub fn code_extension(language: Option<&str>) -> &'static str {
    match language.map(|l| l.to_ascii_lowercase()).as_deref() {
        Some("rust" | "rs") => "rs",
        Some("python" | "py") => "py",
        Some("javascript" | "js") => "js",
        Some("typescript" | "ts") => "ts",
        Some("java") => "java",
        Some("go" | "golang") => "go",
        Some("c") => "c",
        Some("cpp" | "c++" | "cxx") => "cpp",
        Some("csharp" | "cs" | "c#") => "cs",
        Some("ruby" | "rb") => "rb",
        Some("shell" | "bash" | "sh" | "zsh") => "sh",
        Some("json") => "json",
        Some("yaml" | "yml") => "yaml",
        Some("toml") => "toml",
        Some("html") => "html",
        Some("css") => "css",
        Some("sql") => "sql",
        Some("xml") => "xml",
        Some("markdown" | "md") => "md",
        _ => "txt",
    }
}

/// File extension for a diagram language tag.
pub fn diagram_extension(language: Option<&str>) -> &'static str {
    match language.map(|l| l.to_ascii_lowercase()).as_deref() {
        Some("mermaid") => "mmd",
        Some("plantuml" | "puml") => "puml",
        Some("graphviz" | "dot") => "dot",
        Some("d2") => "d2",
        _ => "txt",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_locator() {
        assert_eq!(normalize_locator("  ./img/a.png "), "img/a.png");
        assert_eq!(normalize_locator("<my file.png>"), "my file.png");
        assert_eq!(normalize_locator("a.png \"Title\""), "a.png");
        assert_eq!(normalize_locator("https://x.io/a.png"), "https://x.io/a.png");
    }

    #[test]
    fn test_ids_are_per_kind_and_zero_based() {
        let mut reg = ResourceRegistry::in_memory();
        assert_eq!(reg.process_image("a.png", "").id, "img_000");
        assert_eq!(reg.process_image("b.png", "").id, "img_001");
        assert_eq!(reg.process_code("x", Some("rust")).id, "code_000");
        assert_eq!(reg.process_diagram("graph TD").id, "diagram_000");
        assert_eq!(reg.process_font("f.woff", "F").id, "font_000");
        assert_eq!(reg.process_other("data.csv", "").id, "other_000");
        assert_eq!(reg.len(), 6);
    }

    #[test]
    fn test_dedup_returns_same_record() {
        let mut reg = ResourceRegistry::in_memory();
        let first = reg.process_image("./a.png", "first");
        let second = reg.process_image("a.png", "second");
        assert_eq!(first, second);
        assert_eq!(second.label.as_deref(), Some("first"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_locator_prefix_is_distinct() {
        let mut reg = ResourceRegistry::in_memory();
        let a = reg.process_image("img/a.png", "");
        let b = reg.process_image("img/a.png.bak", "");
        assert_ne!(a.id, b.id);
        assert_ne!(a.content_hash, b.content_hash);
    }

    #[test]
    fn test_code_signature_includes_language() {
        let mut reg = ResourceRegistry::in_memory();
        let a = reg.process_code("print(1)", Some("python"));
        let b = reg.process_code("print(1)", Some("ruby"));
        let c = reg.process_code("print(1)", Some("python"));
        assert_ne!(a.id, b.id);
        assert_eq!(a.id, c.id);
    }

    #[test]
    fn test_diagram_language_detected() {
        let mut reg = ResourceRegistry::in_memory();
        let rec = reg.process_diagram("@startuml\nA -> B\n@enduml");
        assert_eq!(rec.language.as_deref(), Some("plantuml"));
        assert_eq!(rec.inline_content.as_deref(), Some("@startuml\nA -> B\n@enduml"));
        assert!(rec.is_reference_only());
    }

    #[test]
    fn test_update_version() {
        let mut reg = ResourceRegistry::in_memory();
        let rec = reg.process_code("x", None);
        assert!(reg.update_version(&rec.id, "2.0.0"));
        assert!(!reg.update_version("code_999", "2.0.0"));
        let updated = reg.get(&rec.id).unwrap();
        assert_eq!(updated.version, "2.0.0");
        assert!(updated.updated_at.is_some());
        assert_eq!(reg.snapshot().versions[&rec.id].version, "2.0.0");
    }

    #[test]
    fn test_cleanup_unused_is_advisory() {
        let mut reg = ResourceRegistry::in_memory();
        let a = reg.process_code("a", None);
        reg.process_code("b", None);
        let unused = reg.cleanup_unused([a.id.as_str()]);
        assert_eq!(unused, vec!["code_001".to_string()]);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_restore_never_reuses_ids() {
        let mut old = ResourceRegistry::in_memory();
        old.process_image("a.png", "");
        old.process_image("b.png", "");
        let snap = old.snapshot();

        let mut fresh = ResourceRegistry::in_memory();
        fresh.restore(snap);
        assert_eq!(fresh.len(), 2);
        assert_eq!(fresh.process_image("a.png", "").id, "img_000");
        assert_eq!(fresh.process_image("c.png", "").id, "img_002");
    }

    #[test]
    fn test_code_extension() {
        assert_eq!(code_extension(Some("Rust")), "rs");
        assert_eq!(code_extension(Some("brainfuck")), "txt");
        assert_eq!(code_extension(None), "txt");
    }
}
