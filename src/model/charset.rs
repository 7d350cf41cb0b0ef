//! Character set identifiers understood by the decoder.

use serde::{Deserialize, Serialize};

/// The result of charset detection.
///
/// A byte order mark always wins over the hint and the heuristic scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CharsetGuess {
    Utf8,
    Utf16Be,
    Utf16Le,
    Gbk,
    Gb2312,
    Gb18030,
    Big5,
    Iso8859_1,
}

impl CharsetGuess {
    /// Canonical lowercase label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf16Be => "utf-16be",
            Self::Utf16Le => "utf-16le",
            Self::Gbk => "gbk",
            Self::Gb2312 => "gb2312",
            Self::Gb18030 => "gb18030",
            Self::Big5 => "big5",
            Self::Iso8859_1 => "iso-8859-1",
        }
    }

    /// Normalize a declared charset label against the known set.
    ///
    /// Case, surrounding whitespace and quotes are ignored. Labels outside
    /// the set return `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        let cleaned = label
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .trim()
            .to_ascii_lowercase();
        match cleaned.as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "gbk" => Some(Self::Gbk),
            "gb2312" => Some(Self::Gb2312),
            "gb18030" => Some(Self::Gb18030),
            "big5" => Some(Self::Big5),
            "iso-8859-1" | "latin1" => Some(Self::Iso8859_1),
            _ => None,
        }
    }

    /// Length of the byte order mark for this charset, if `bytes` starts with one.
    pub fn bom_len(self, bytes: &[u8]) -> usize {
        match self {
            Self::Utf8 if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) => 3,
            Self::Utf16Be if bytes.starts_with(&[0xFE, 0xFF]) => 2,
            Self::Utf16Le if bytes.starts_with(&[0xFF, 0xFE]) => 2,
            _ => 0,
        }
    }
}

impl std::fmt::Display for CharsetGuess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Double-byte legacy encodings handled by the CJK decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CjkVariant {
    Gbk,
    Big5,
}
