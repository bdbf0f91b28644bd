//! Resource records for extracted assets (images, code, diagrams, fonts, etc.)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A deduplicated, identified descriptor for an extracted asset.
///
/// Records are created by [`crate::assets::ResourceRegistry`] on first sight of
/// a content signature and are immutable afterwards, except for an explicit
/// version bump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Stable identifier (e.g., "img_000")
    pub id: String,

    /// Resource kind
    pub kind: ResourceKind,

    /// Hex content signature used for deduplication
    pub content_hash: String,

    /// Copy inside the managed asset directory, absent for reference-only records
    pub local_path: Option<PathBuf>,

    /// Original locator (path or URL) for images, fonts and other files
    pub source_locator: Option<String>,

    /// Inline source for code and diagrams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_content: Option<String>,

    /// Language tag for code and diagrams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Alternative text or display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last version bump, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Resource version
    pub version: String,
}

impl ResourceRecord {
    /// Create a new record with no locator, content or local copy.
    pub fn new(
        id: impl Into<String>,
        kind: ResourceKind,
        content_hash: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            content_hash: content_hash.into(),
            local_path: None,
            source_locator: None,
            inline_content: None,
            language: None,
            label: None,
            created_at: Utc::now(),
            updated_at: None,
            version: version.into(),
        }
    }

    /// Set the source locator.
    pub fn with_locator(mut self, locator: impl Into<String>) -> Self {
        self.source_locator = Some(locator.into());
        self
    }

    /// Set inline content.
    pub fn with_inline_content(mut self, content: impl Into<String>) -> Self {
        self.inline_content = Some(content.into());
        self
    }

    /// Set the language tag.
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language.filter(|l| !l.is_empty());
        self
    }

    /// Set the label (alt text or name).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        if !label.is_empty() {
            self.label = Some(label);
        }
        self
    }

    /// Check if this record has no local copy.
    pub fn is_reference_only(&self) -> bool {
        self.local_path.is_none()
    }

    /// Check if this is an image resource.
    pub fn is_image(&self) -> bool {
        matches!(self.kind, ResourceKind::Image)
    }

    /// Check if the locator points to a remote resource.
    pub fn is_remote(&self) -> bool {
        self.source_locator
            .as_deref()
            .map(is_remote_locator)
            .unwrap_or(false)
    }

    /// Detect MIME type from data magic bytes.
    pub fn detect_mime_type(data: &[u8]) -> Option<&'static str> {
        if data.len() < 4 {
            return None;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some("image/jpeg");
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some("image/png");
        }

        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some("image/gif");
        }

        // WEBP: RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some("image/webp");
        }

        if data.starts_with(b"<svg") || data.starts_with(b"<?xml") {
            return Some("image/svg+xml");
        }

        if data.starts_with(b"wOFF") {
            return Some("font/woff");
        }
        if data.starts_with(b"wOF2") {
            return Some("font/woff2");
        }
        if data.starts_with(&[0x00, 0x01, 0x00, 0x00]) {
            return Some("font/ttf");
        }
        if data.starts_with(b"OTTO") {
            return Some("font/otf");
        }

        None
    }

    /// File extension for a MIME type produced by [`Self::detect_mime_type`].
    pub fn extension_for_mime(mime: &str) -> &'static str {
        match mime {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/svg+xml" => "svg",
            "font/woff" => "woff",
            "font/woff2" => "woff2",
            "font/ttf" => "ttf",
            "font/otf" => "otf",
            _ => "bin",
        }
    }
}

/// Check if a locator refers to a network resource.
pub fn is_remote_locator(locator: &str) -> bool {
    let lower = locator.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Kind of extracted resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Image (PNG, JPEG, SVG, etc.)
    Image,
    /// Fenced or inline source code
    Code,
    /// Diagram source (mermaid, plantuml, ...)
    Diagram,
    /// Font file
    Font,
    /// Other/unknown
    Other,
}

impl ResourceKind {
    /// All kinds, in counter order.
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Image,
        ResourceKind::Code,
        ResourceKind::Diagram,
        ResourceKind::Font,
        ResourceKind::Other,
    ];

    /// Prefix used for record IDs of this kind.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ResourceKind::Image => "img",
            ResourceKind::Code => "code",
            ResourceKind::Diagram => "diagram",
            ResourceKind::Font => "font",
            ResourceKind::Other => "other",
        }
    }

    /// Subdirectory of the managed asset directory for this kind.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ResourceKind::Image => "images",
            ResourceKind::Code => "code",
            ResourceKind::Diagram => "diagrams",
            ResourceKind::Font => "fonts",
            ResourceKind::Other => "other",
        }
    }

    /// Check if the content signature covers a locator rather than content.
    pub fn is_locator_based(&self) -> bool {
        matches!(
            self,
            ResourceKind::Image | ResourceKind::Font | ResourceKind::Other
        )
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Image => write!(f, "image"),
            ResourceKind::Code => write!(f, "code"),
            ResourceKind::Diagram => write!(f, "diagram"),
            ResourceKind::Font => write!(f, "font"),
            ResourceKind::Other => write!(f, "other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let rec = ResourceRecord::new("img_000", ResourceKind::Image, "abc", "1.0.0")
            .with_locator("https://example.com/a.png")
            .with_label("A chart");
        assert!(rec.is_image());
        assert!(rec.is_remote());
        assert!(rec.is_reference_only());
        assert_eq!(rec.label.as_deref(), Some("A chart"));
    }

    #[test]
    fn test_empty_label_and_language_dropped() {
        let rec = ResourceRecord::new("code_000", ResourceKind::Code, "abc", "1.0.0")
            .with_label("")
            .with_language(Some(String::new()));
        assert!(rec.label.is_none());
        assert!(rec.language.is_none());
    }

    #[test]
    fn test_detect_mime_type() {
        let png_data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(ResourceRecord::detect_mime_type(&png_data), Some("image/png"));

        let jpeg_data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00];
        assert_eq!(ResourceRecord::detect_mime_type(&jpeg_data), Some("image/jpeg"));

        assert_eq!(ResourceRecord::detect_mime_type(b"xx"), None);
        assert_eq!(ResourceRecord::extension_for_mime("image/svg+xml"), "svg");
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ResourceKind::Diagram).unwrap();
        assert_eq!(json, "\"diagram\"");
        assert_eq!(ResourceKind::Image.id_prefix(), "img");
        assert!(!ResourceKind::Code.is_locator_based());
    }
}
