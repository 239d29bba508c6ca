// Decoding raw file bytes into source text

use serde::{Deserialize, Serialize};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Encoding that successfully decoded a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    Utf8,
    /// ISO-8859-1; every byte maps to the code point of the same value
    Latin1,
}

/// Decode file contents, trying UTF-8 first and falling back to Latin-1.
///
/// Latin-1 accepts any byte sequence, so decoding itself never fails.
pub fn decode(bytes: &[u8]) -> (String, TextEncoding) {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), TextEncoding::Utf8),
        Err(_) => (bytes.iter().map(|&b| b as char).collect(), TextEncoding::Latin1),
    }
}
