//! Input decoding.

use crate::error::{Error, Result};
use unicode_normalization::UnicodeNormalization;

/// Decode raw input bytes into text with `\n` line endings.
///
/// Handles UTF-8 (with or without BOM) and UTF-16 with a BOM, falling back
/// to Latin-1 for anything else. When `normalize` is set the result is
/// NFC-normalized.
pub fn decode_text(bytes: &[u8], normalize: bool) -> Result<String> {
    let text = decode_bytes(bytes)?;
    let text = normalize_line_endings(&text);
    if normalize {
        Ok(text.nfc().collect())
    } else {
        Ok(text)
    }
}

fn decode_bytes(bytes: &[u8]) -> Result<String> {
    // UTF-8 BOM
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8(rest.to_vec())
            .map_err(|e| Error::Encoding(format!("invalid UTF-8 after BOM: {}", e)));
    }

    // UTF-16 with BOM
    if bytes.len() >= 2 && (bytes[..2] == [0xFE, 0xFF] || bytes[..2] == [0xFF, 0xFE]) {
        let big_endian = bytes[0] == 0xFE;
        let body = &bytes[2..];
        if body.len() % 2 != 0 {
            return Err(Error::Encoding("odd byte count in UTF-16 input".into()));
        }
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|c| {
                if big_endian {
                    u16::from_be_bytes([c[0], c[1]])
                } else {
                    u16::from_le_bytes([c[0], c[1]])
                }
            })
            .collect();
        return String::from_utf16(&units)
            .map_err(|e| Error::Encoding(format!("invalid UTF-16: {}", e)));
    }

    // Try UTF-8
    if let Ok(s) = std::str::from_utf8(bytes) {
        return Ok(s.to_string());
    }

    // Fallback: Latin-1
    log::debug!("Input is not UTF-8, decoding as Latin-1");
    Ok(bytes.iter().map(|&b| b as char).collect())
}

fn normalize_line_endings(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}
