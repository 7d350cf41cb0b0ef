//! Byte buffers, MIME parts and decoded documents.
//!
//! Every value here lives for a single decode call.

use serde::{Deserialize, Serialize};

use crate::parser::header;

/// Immutable input bytes plus the content type the collaborator declared.
#[derive(Debug, Clone, Copy)]
pub struct ByteBuffer<'a> {
    pub bytes: &'a [u8],
    pub content_type: Option<&'a str>,
}

impl<'a> ByteBuffer<'a> {
    pub fn new(bytes: &'a [u8], content_type: Option<&'a str>) -> Self {
        Self {
            bytes,
            content_type,
        }
    }
}

/// Content-Transfer-Encoding of a MIME part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEncoding {
    Base64,
    QuotedPrintable,
    /// `7bit`, `8bit`, `binary`, an unknown label, or no header at all.
    Identity(String),
}

impl TransferEncoding {
    pub fn from_header(value: Option<&str>) -> Self {
        let label = value.unwrap_or("").trim().to_ascii_lowercase();
        match label.as_str() {
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            _ => Self::Identity(label),
        }
    }
}

/// One part of a multipart body.
#[derive(Debug, Clone)]
pub struct MimePart {
    /// Unfolded headers in order of appearance, names lowercased.
    pub headers: Vec<(String, String)>,
    /// Body bytes exactly as they appear between the header block and the next boundary.
    pub body: Vec<u8>,
}

impl MimePart {
    /// First value of a header (name is matched case-insensitively).
    pub fn header(&self, name: &str) -> Option<&str> {
        header::get_header(&self.headers, name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// `true` iff `Content-Type` starts with `text/html`.
    pub fn is_html(&self) -> bool {
        self.content_type()
            .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with("text/html"))
            .unwrap_or(false)
    }

    /// The `charset=` parameter of `Content-Type`, if any.
    pub fn charset(&self) -> Option<String> {
        self.content_type().and_then(header::charset_param)
    }

    pub fn transfer_encoding(&self) -> TransferEncoding {
        TransferEncoding::from_header(self.header("content-transfer-encoding"))
    }

    pub fn content_location(&self) -> Option<&str> {
        self.header("content-location")
    }
}

/// Output of the MHTML pipeline, tagged with the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tier", content = "html", rename_all = "snake_case")]
pub enum MhtmlOutcome {
    /// A `text/html` part was found and decoded.
    Structured(String),
    /// No usable MIME structure; the first `<html>…</html>` block was extracted.
    RegexFallback(String),
    /// Nothing recognizable; the decoded text is returned unchanged.
    RawPassthrough(String),
}

impl MhtmlOutcome {
    pub fn html(&self) -> &str {
        match self {
            Self::Structured(s) | Self::RegexFallback(s) | Self::RawPassthrough(s) => s,
        }
    }

    pub fn into_html(self) -> String {
        match self {
            Self::Structured(s) | Self::RegexFallback(s) | Self::RawPassthrough(s) => s,
        }
    }

    pub fn tier(&self) -> &'static str {
        match self {
            Self::Structured(_) => "structured",
            Self::RegexFallback(_) => "regex_fallback",
            Self::RawPassthrough(_) => "raw_passthrough",
        }
    }
}

/// Text ready for display, with the MIME type it should be shown as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedDocument {
    pub mime_type: String,
    pub text: String,
    pub source_file_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(headers: &[(&str, &str)]) -> MimePart {
        MimePart {
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: Vec::new(),
        }
    }

    #[test]
    fn test_is_html_case_insensitive() {
        assert!(part(&[("content-type", "Text/HTML; charset=utf-8")]).is_html());
        assert!(!part(&[("content-type", "image/png")]).is_html());
        assert!(!part(&[]).is_html());
    }

    #[test]
    fn test_charset_and_encoding() {
        let p = part(&[
            ("content-type", "text/html; charset=\"GBK\""),
            ("content-transfer-encoding", " Base64 "),
        ]);
        assert_eq!(p.charset().as_deref(), Some("GBK"));
        assert_eq!(p.transfer_encoding(), TransferEncoding::Base64);
    }

    #[test]
    fn test_outcome_accessors() {
        let out = MhtmlOutcome::RegexFallback("<html></html>".into());
        assert_eq!(out.tier(), "regex_fallback");
        assert_eq!(out.html(), "<html></html>");
        assert_eq!(out.into_html(), "<html></html>");
    }
}
