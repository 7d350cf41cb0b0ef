//! Content-Transfer-Encoding decoding (base64, quoted-printable).
//!
//! Both decoders are total: malformed input is returned rather than rejected.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::warn;

use crate::model::document::TransferEncoding;

/// Reverse the transfer encoding of a part body.
pub fn decode_transfer(body: &[u8], encoding: &TransferEncoding) -> Vec<u8> {
    match encoding {
        TransferEncoding::Base64 => decode_base64(body),
        TransferEncoding::QuotedPrintable => decode_quoted_printable(body),
        TransferEncoding::Identity(_) => body.to_vec(),
    }
}

/// Standard base64 with line breaks and other whitespace ignored.
///
/// On malformed input the still-encoded body is returned unchanged.
pub fn decode_base64(body: &[u8]) -> Vec<u8> {
    let compact: Vec<u8> = body
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    match STANDARD.decode(&compact) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(error = %e, len = body.len(), "Malformed base64 body, keeping encoded text");
            body.to_vec()
        }
    }
}

/// Quoted-printable: `=XX` → byte, soft line breaks removed, literal `_` →
/// space. A `=` not followed by two hex digits is kept as is.
///
/// A soft break is `=` followed by optional spaces, tabs or carriage returns
/// and then `\n`, so `=\r\n`, `=\n`, `= \r\n` and `=\r\r\n` all vanish.
pub fn decode_quoted_printable(body: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(body.len());
    let mut i = 0;
    while i < body.len() {
        match body[i] {
            b'=' => {
                let rest = &body[i + 1..];
                if let Some(len) = soft_break_len(rest) {
                    i += 1 + len;
                } else if let Some(byte) = rest.get(..2).and_then(hex_pair) {
                    result.push(byte);
                    i += 3;
                } else {
                    result.push(b'=');
                    i += 1;
                }
            }
            b'_' => {
                result.push(b' ');
                i += 1;
            }
            b => {
                result.push(b);
                i += 1;
            }
        }
    }
    result
}

/// Length of the line ending after a soft-break `=`, padding included.
fn soft_break_len(rest: &[u8]) -> Option<usize> {
    let pad = rest
        .iter()
        .take_while(|&&b| matches!(b, b' ' | b'\t' | b'\r'))
        .count();
    (rest.get(pad) == Some(&b'\n')).then_some(pad + 1)
}

fn hex_pair(pair: &[u8]) -> Option<u8> {
    let hi = char::from(pair[0]).to_digit(16)?;
    let lo = char::from(pair[1]).to_digit(16)?;
    u8::try_from(hi * 16 + lo).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qp_hex_escape_is_single_byte() {
        assert_eq!(decode_quoted_printable(b"caf=E9"), b"caf\xE9");
        assert_eq!(decode_quoted_printable(b"=3D=3d"), b"==");
    }

    #[test]
    fn test_qp_soft_breaks_vanish() {
        assert_eq!(decode_quoted_printable(b"long=\r\nline=\nend"), b"longlineend");
    }

    #[test]
    fn test_qp_soft_break_with_trailing_padding() {
        assert_eq!(decode_quoted_printable(b"Quarterly =\r\r\nreport"), b"Quarterly report");
        assert_eq!(decode_quoted_printable(b"a= \t\r\nb"), b"ab");
        assert_eq!(decode_quoted_printable(b"a=\t\nb"), b"ab");
    }

    #[test]
    fn test_qp_padding_without_newline_is_literal() {
        assert_eq!(decode_quoted_printable(b"a= b"), b"a= b");
        assert_eq!(decode_quoted_printable(b"a=\r"), b"a=\r");
    }

    #[test]
    fn test_qp_underscore_is_space() {
        assert_eq!(decode_quoted_printable(b"a_b"), b"a b");
    }

    #[test]
    fn test_qp_stray_equals_kept() {
        assert_eq!(decode_quoted_printable(b"a=zz="), b"a=zz=");
        assert_eq!(decode_quoted_printable(b"x=4"), b"x=4");
    }

    #[test]
    fn test_base64_with_line_breaks() {
        let body = b"PGh0bWw+\r\nSGk8L2h0bWw+\r\n";
        assert_eq!(decode_base64(body), b"<html>Hi</html>");
    }

    #[test]
    fn test_base64_malformed_returns_encoded() {
        let body = b"not*base64!";
        assert_eq!(decode_base64(body), body.to_vec());
    }

    #[test]
    fn test_identity_passthrough() {
        let body = b"<p>=E9_</p>";
        assert_eq!(
            decode_transfer(body, &TransferEncoding::Identity("8bit".into())),
            body.to_vec()
        );
    }
}
