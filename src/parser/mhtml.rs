//! MHTML (`multipart/related` web archive) → displayable HTML.
//!
//! Three tiers, each cheaper than the last:
//! 1. structured: boundary split, first `text/html` part, transfer decoding
//! 2. regex: first `<html>…</html>` block of the decoded text
//! 3. raw: the decoded text unchanged
//!
//! [`decode_mhtml`] never fails; the returned [`MhtmlOutcome`] records which
//! tier produced the HTML.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use super::header::{
    boundary_param, charset_param, decode_header_bytes, find_header_end, get_header,
    unfold_headers,
};
use super::multipart::{find_boundary, split_parts};
use super::transfer::decode_transfer;
use crate::charset::decode_text;
use crate::charset::detect::detect_bom;
use crate::model::charset::CharsetGuess;
use crate::model::document::MhtmlOutcome;

/// Match the first complete `<html …>…</html>` block.
#[allow(clippy::expect_used)]
static HTML_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<html[\s>].*?</html\s*>").expect("valid regex"));

/// Match a `charset=` declaration in a header line.
#[allow(clippy::expect_used)]
static HEADER_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*["']?([A-Za-z0-9_.:\-]+)"#).expect("valid regex")
});

/// Match MIME header lines that leaked into the HTML body.
#[allow(clippy::expect_used)]
static LEAKED_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^(?:content-[a-z-]+|mime-version)[ \t]*:.*(?:\r?\n)?").expect("valid regex")
});

/// Match runs of two or more blank lines (three or more line breaks).
#[allow(clippy::expect_used)]
static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:[ \t]*\r?\n){3,}").expect("valid regex"));

/// Match `<meta charset=…>` and `<meta http-equiv=… content="…; charset=…">`.
#[allow(clippy::expect_used)]
static META_CHARSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<meta\b[^>]*\bcharset\s*=[^>]*>").expect("valid regex"));

/// Match `href="/…"` and `src="/…"` but not protocol-relative `//…`.
#[allow(clippy::expect_used)]
static ROOT_RELATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(href|src)\s*=\s*(["'])/([^/])"#).expect("valid regex")
});

const META_UTF8: &str = r#"<meta charset="utf-8">"#;

/// Tuning for the post-processing step.
#[derive(Debug, Clone)]
pub struct MhtmlOptions {
    /// Rewrite root-relative `href`/`src` to absolute `https://` URLs.
    pub rewrite_root_relative: bool,
    /// Origin used for rewriting when the archive names no location.
    pub fallback_origin: Option<String>,
}

impl Default for MhtmlOptions {
    fn default() -> Self {
        Self {
            rewrite_root_relative: true,
            fallback_origin: None,
        }
    }
}

/// Decode an MHTML archive with default options.
pub fn decode_mhtml(bytes: &[u8], declared_content_type: Option<&str>) -> MhtmlOutcome {
    decode_mhtml_with(bytes, declared_content_type, &MhtmlOptions::default())
}

/// Decode an MHTML archive. Total: every failure degrades to the next tier.
pub fn decode_mhtml_with(
    bytes: &[u8],
    declared_content_type: Option<&str>,
    options: &MhtmlOptions,
) -> MhtmlOutcome {
    let seed = declared_content_type
        .and_then(charset_param)
        .or_else(|| leading_charset(bytes));
    let text = decode_text(bytes, seed.as_deref());

    let boundary = declared_content_type
        .and_then(boundary_param)
        .or_else(|| find_boundary(&text));
    let Some(boundary) = boundary else {
        debug!("No MIME boundary found, trying <html> extraction");
        return fallback(text);
    };

    // A UTF-16 archive is split on its decoded text; its parts are UTF-8 from here on.
    let raw = match detect_bom(bytes) {
        Some(CharsetGuess::Utf16Be | CharsetGuess::Utf16Le) => text.as_bytes(),
        _ => bytes,
    };
    let parts = split_parts(raw, &boundary);
    let Some(part) = parts.iter().find(|p| p.is_html()) else {
        debug!(
            boundary = %boundary,
            parts = parts.len(),
            "No text/html part, trying <html> extraction"
        );
        return fallback(text);
    };

    let body = decode_transfer(&part.body, &part.transfer_encoding());
    let charset = part.charset().or(seed);
    let html = decode_text(&body, charset.as_deref());

    let origin = if options.rewrite_root_relative {
        part.content_location()
            .and_then(origin_of)
            .or_else(|| document_location(&text).as_deref().and_then(origin_of))
            .or_else(|| options.fallback_origin.clone())
    } else {
        None
    };

    debug!(
        boundary = %boundary,
        parts = parts.len(),
        charset = charset.as_deref().unwrap_or("-"),
        "Decoded MHTML html part"
    );
    MhtmlOutcome::Structured(post_process(&html, &boundary, origin.as_deref()))
}

/// Regex extraction, then raw passthrough.
fn fallback(text: String) -> MhtmlOutcome {
    match HTML_BLOCK_RE.find(&text) {
        Some(m) => MhtmlOutcome::RegexFallback(m.as_str().to_string()),
        None => {
            debug!(len = text.len(), "No <html> block, passing text through");
            MhtmlOutcome::RawPassthrough(text)
        }
    }
}

/// `charset=` from the leading header block of the raw bytes.
fn leading_charset(bytes: &[u8]) -> Option<String> {
    let (header_end, _) = find_header_end(bytes)?;
    let headers = decode_header_bytes(&bytes[..header_end]);
    HEADER_CHARSET_RE
        .captures(&headers)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// `Snapshot-Content-Location` (or `Content-Location`) of the archive itself.
fn document_location(text: &str) -> Option<String> {
    let (header_end, _) = find_header_end(text.as_bytes())?;
    let headers = unfold_headers(text.get(..header_end)?);
    get_header(&headers, "snapshot-content-location")
        .or_else(|| get_header(&headers, "content-location"))
        .map(String::from)
}

/// `https://host[:port]` for an absolute http(s) location.
fn origin_of(location: &str) -> Option<String> {
    let url = url::Url::parse(location.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("https://{host}:{port}"),
        None => format!("https://{host}"),
    })
}

fn post_process(html: &str, boundary: &str, origin: Option<&str>) -> String {
    let mut out = LEAKED_HEADER_RE.replace_all(html, "").into_owned();
    out = strip_boundary_lines(&out, boundary);
    out = BLANK_RUN_RE.replace_all(&out, "\n\n").into_owned();
    out = ensure_wrapper(&out);
    if let Some(origin) = origin {
        out = rewrite_root_relative(&out, origin);
    }
    out
}

fn strip_boundary_lines(html: &str, boundary: &str) -> String {
    let pattern = format!(r"(?m)^--{}(?:--)?[ \t]*\r?(?:\n|$)", regex::escape(boundary));
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(html, "").into_owned(),
        Err(e) => {
            warn!(error = %e, "Could not build boundary pattern");
            html.to_string()
        }
    }
}

/// Guarantee `<html><head><meta charset="utf-8"></head>…`.
///
/// The text has already been decoded to UTF-8, so any other charset
/// declaration is replaced.
pub fn ensure_wrapper(html: &str) -> String {
    let had_meta = META_CHARSET_RE.is_match(html);
    let html = META_CHARSET_RE.replace_all(html, META_UTF8).into_owned();
    let lower = html.to_ascii_lowercase();

    let Some(html_tag) = find_tag(&lower, "<html") else {
        return format!(
            "<html><head>{META_UTF8}</head><body>{}</body></html>",
            html.trim()
        );
    };
    let Some(head_tag) = find_tag(&lower, "<head") else {
        let at = tag_end(&lower, html_tag);
        return format!("{}<head>{META_UTF8}</head>{}", &html[..at], &html[at..]);
    };
    if had_meta {
        return html;
    }
    let at = tag_end(&lower, head_tag);
    format!("{}{META_UTF8}{}", &html[..at], &html[at..])
}

/// Start of `<name` followed by whitespace, `>` or `/` (so `<header` is not `<head`).
fn find_tag(lower: &str, open: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(rel) = lower.get(from..)?.find(open) {
        let pos = from + rel;
        match lower.as_bytes().get(pos + open.len()) {
            None => return Some(pos),
            Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => return Some(pos),
            _ => from = pos + open.len(),
        }
    }
    None
}

/// Byte offset just past the `>` closing the tag that starts at `start`.
fn tag_end(lower: &str, start: usize) -> usize {
    lower[start..]
        .find('>')
        .map(|p| start + p + 1)
        .unwrap_or(lower.len())
}

/// Prefix root-relative `href`/`src` values with `origin`.
pub fn rewrite_root_relative(html: &str, origin: &str) -> String {
    let origin = origin.trim_end_matches('/');
    ROOT_RELATIVE_RE
        .replace_all(html, |caps: &regex::Captures| {
            format!("{}={}{}/{}", &caps[1], &caps[2], origin, &caps[3])
        })
        .into_owned()
}
