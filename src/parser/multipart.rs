//! Splitting a multipart body into header + body parts on its boundary marker.

use std::sync::LazyLock;

use regex::Regex;

use super::header::{decode_header_bytes, find_header_end, unfold_headers};
use crate::model::document::MimePart;

/// Match `boundary="..."` or a bare `boundary=token`.
#[allow(clippy::expect_used)]
static BOUNDARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bboundary\s*=\s*(?:"([^"]+)"|([^\s;"]+))"#).expect("valid regex")
});

/// Locate the first `boundary=` parameter anywhere in `text`.
pub fn find_boundary(text: &str) -> Option<String> {
    let caps = BOUNDARY_RE.captures(text)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().trim().to_string())
        .filter(|b| !b.is_empty())
}

/// Split `raw` on `--{boundary}` and parse each part's header block.
///
/// The preamble before the first marker and everything after the closing
/// `--{boundary}--` marker are dropped. A part without a blank line is read as
/// headers only.
pub fn split_parts(raw: &[u8], boundary: &str) -> Vec<MimePart> {
    let delimiter = format!("--{boundary}");
    let delimiter = delimiter.as_bytes();

    let mut positions = Vec::new();
    let mut from = 0;
    while let Some(pos) = find_subslice(raw, delimiter, from) {
        positions.push(pos);
        from = pos + delimiter.len();
    }

    let mut parts = Vec::new();
    for (idx, &pos) in positions.iter().enumerate() {
        let start = pos + delimiter.len();
        let end = positions.get(idx + 1).copied().unwrap_or(raw.len());
        let segment = &raw[start..end];
        if segment.starts_with(b"--") {
            break;
        }
        parts.push(parse_part(skip_line(segment)));
    }
    parts
}

fn parse_part(segment: &[u8]) -> MimePart {
    let (header_bytes, body) = match find_header_end(segment) {
        Some((header_end, body_start)) => (&segment[..header_end], &segment[body_start..]),
        None => (segment, &segment[segment.len()..]),
    };
    MimePart {
        headers: unfold_headers(&decode_header_bytes(header_bytes)),
        body: strip_trailing_newline(body).to_vec(),
    }
}

/// Skip the remainder of the boundary line (transport padding and the line break).
fn skip_line(segment: &[u8]) -> &[u8] {
    match segment.iter().position(|&b| b == b'\n') {
        Some(nl) if segment[..nl].iter().all(|b| b.is_ascii_whitespace()) => &segment[nl + 1..],
        _ => segment,
    }
}

/// The line break before a delimiter belongs to the delimiter.
fn strip_trailing_newline(body: &[u8]) -> &[u8] {
    body.strip_suffix(b"\r\n")
        .or_else(|| body.strip_suffix(b"\n"))
        .unwrap_or(body)
}

fn find_subslice(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|p| p + from)
}
