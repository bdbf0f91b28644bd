//! Input format detection.
//!
//! Formats are named the way [`crate::parser::ParserRegistry`] keys them:
//! `"markdown"` or `"text"`.

use crate::error::{Error, Result};
use crate::parser::decode::decode_text;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Bytes inspected when sniffing content.
const SNIFF_LEN: usize = 4096;

const UTF16_BOMS: [&[u8]; 2] = [&[0xFE, 0xFF], &[0xFF, 0xFE]];

/// Detect the format of a file.
///
/// The extension decides when it is known; otherwise the leading bytes are
/// sniffed.
///
/// # Example
/// ```no_run
/// use docbridge::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("README").unwrap();
/// println!("format: {}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<&'static str> {
    let path = path.as_ref();
    if let Some(format) = format_from_extension(path) {
        return Ok(format);
    }

    let mut head = Vec::with_capacity(SNIFF_LEN);
    File::open(path)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)?;
    detect_format_from_bytes(&head)
}

/// Map a known file extension to its format name.
pub fn format_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "md" | "markdown" | "mdown" | "mkd" => Some("markdown"),
        "txt" | "text" => Some("text"),
        _ => None,
    }
}

/// Detect the format from leading bytes.
///
/// A front matter fence, ATX heading or code fence before any prose means
/// markdown; anything else decodable is text. NUL bytes outside UTF-16
/// input mean binary data and are rejected.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<&'static str> {
    let text = if UTF16_BOMS.iter().any(|bom| data.starts_with(bom)) {
        // Truncated sniff buffers may split a code unit.
        let even = data.len() & !1;
        decode_text(&data[..even], false)?
    } else if data.contains(&0) {
        return Err(Error::UnsupportedFormat("binary input".to_string()));
    } else {
        decode_text(data, false)?
    };

    Ok(sniff_text(&text))
}

fn sniff_text(text: &str) -> &'static str {
    let Some(first) = text.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return "text";
    };

    let is_heading = first
        .strip_prefix('#')
        .map(|rest| rest.trim_start_matches('#'))
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace));

    if first == "---" || first.starts_with("```") || is_heading {
        "markdown"
    } else {
        "text"
    }
}

/// Check if the data looks like markdown.
pub fn is_markdown_bytes(data: &[u8]) -> bool {
    matches!(detect_format_from_bytes(data), Ok("markdown"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_front_matter() {
        assert_eq!(detect_format_from_bytes(b"---\ntitle: x\n---\n").unwrap(), "markdown");
    }

    #[test]
    fn test_detect_heading() {
        assert_eq!(detect_format_from_bytes(b"\n\n# Title\nbody").unwrap(), "markdown");
        assert_eq!(detect_format_from_bytes(b"#hashtag").unwrap(), "text");
    }

    #[test]
    fn test_detect_plain_text() {
        assert_eq!(detect_format_from_bytes(b"Meeting notes\n- a").unwrap(), "text");
        assert_eq!(detect_format_from_bytes(b"").unwrap(), "text");
    }

    #[test]
    fn test_detect_binary_rejected() {
        let result = detect_format_from_bytes(&[0x89, b'P', b'N', b'G', 0x00, 0x01]);
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_detect_utf16_with_bom() {
        let mut data = vec![0xFF, 0xFE];
        for unit in "# Hi".encode_utf16() {
            data.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(detect_format_from_bytes(&data).unwrap(), "markdown");
    }

    #[test]
    fn test_extension_wins() {
        assert_eq!(format_from_extension(Path::new("a/B.MD")), Some("markdown"));
        assert_eq!(format_from_extension(Path::new("notes.txt")), Some("text"));
        assert_eq!(format_from_extension(Path::new("image.png")), None);
    }

    #[test]
    fn test_detect_from_path_sniffs_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README");
        std::fs::write(&path, "# Project\n").unwrap();
        assert_eq!(detect_format_from_path(&path).unwrap(), "markdown");
    }

    #[test]
    fn test_is_markdown_bytes() {
        assert!(is_markdown_bytes(b"```rust\nfn x() {}\n```"));
        assert!(!is_markdown_bytes(b"plain"));
    }
}
