//! Bytes → `String` using a detected or declared charset.

use encoding_rs::{GB18030, UTF_16BE, UTF_16LE};
use tracing::debug;

use super::detect::{detect_bom, detect_charset};
use super::legacy::decode_legacy_cjk;
use crate::model::charset::{CharsetGuess, CjkVariant};

/// Decode `bytes` to text, consulting `declared` when the bytes are ambiguous.
///
/// Order: byte order mark, strict UTF-8, a recognized declared charset, then
/// the heuristic in [`detect_charset`].
pub fn decode_text(bytes: &[u8], declared: Option<&str>) -> String {
    if let Some(bom) = detect_bom(bytes) {
        return decode_with(bytes, bom);
    }
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    let charset = match declared.and_then(CharsetGuess::from_label) {
        Some(charset) => charset,
        None => detect_charset(bytes, declared),
    };
    debug!(charset = %charset, len = bytes.len(), "Decoding non-UTF-8 bytes");
    decode_with(bytes, charset)
}

/// Decode `bytes` with a specific charset. A matching BOM is stripped.
pub fn decode_with(bytes: &[u8], charset: CharsetGuess) -> String {
    let bytes = &bytes[charset.bom_len(bytes)..];
    match charset {
        CharsetGuess::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        CharsetGuess::Utf16Be => UTF_16BE
            .decode_without_bom_handling(bytes)
            .0
            .into_owned(),
        CharsetGuess::Utf16Le => UTF_16LE
            .decode_without_bom_handling(bytes)
            .0
            .into_owned(),
        CharsetGuess::Gbk | CharsetGuess::Gb2312 => decode_legacy_cjk(bytes, CjkVariant::Gbk),
        CharsetGuess::Big5 => decode_legacy_cjk(bytes, CjkVariant::Big5),
        CharsetGuess::Gb18030 => GB18030
            .decode_without_bom_handling(bytes)
            .0
            .into_owned(),
        CharsetGuess::Iso8859_1 => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bom_overrides_declared() {
        let bytes = [0xEF, 0xBB, 0xBF, 0x68, 0x69];
        assert_eq!(decode_text(&bytes, Some("gbk")), "hi");
    }

    #[test]
    fn test_utf16le_bom() {
        let bytes = [0xFF, 0xFE, b'h', 0x00, b'i', 0x00];
        assert_eq!(decode_text(&bytes, None), "hi");
    }

    #[test]
    fn test_utf16be_bom() {
        let bytes = [0xFE, 0xFF, 0x4E, 0x2D];
        assert_eq!(decode_text(&bytes, None), "中");
    }

    #[test]
    fn test_valid_utf8_ignores_declared() {
        assert_eq!(decode_text("café".as_bytes(), Some("latin1")), "café");
    }

    #[test]
    fn test_declared_latin1() {
        assert_eq!(decode_text(b"caf\xE9", Some("ISO-8859-1")), "café");
    }

    #[test]
    fn test_declared_big5() {
        assert_eq!(decode_text(&[0xA4, 0xA4, 0xA4, 0xE5], Some("big5")), "中文");
    }

    #[test]
    fn test_heuristic_gbk_without_declaration() {
        let bytes = [0xD6, 0xD0, 0xCE, 0xC4];
        assert_eq!(decode_text(&bytes, None), "中文");
    }

    #[test]
    fn test_gb18030_four_byte_sequence() {
        // U+00A5 YEN SIGN is a four-byte sequence in GB18030.
        let bytes = [0x81, 0x30, 0x84, 0x36];
        assert_eq!(decode_with(&bytes, CharsetGuess::Gb18030), "\u{A5}");
    }

    #[test]
    fn test_unknown_label_falls_back_to_heuristic() {
        let bytes = [0xD6, 0xD0];
        assert_eq!(decode_text(&bytes, Some("x-unknown")), "中");
    }
}
