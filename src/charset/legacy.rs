//! GBK / BIG5 double-byte decoding with a widening fallback.
//!
//! Structurally valid pairs are looked up in the `encoding_rs` tables, which
//! are immutable statics shared by every caller. A pair the table does not
//! map is widened: its 16-bit value is used directly as a code point. That is
//! an approximation, not a certified mapping.

use encoding_rs::{Encoding, BIG5, GBK};

use super::detect::{is_big5_pair, is_gbk_pair};
use crate::model::charset::CjkVariant;

/// Replacement for bytes that cannot start a character.
const UNMAPPABLE: char = '?';

impl CjkVariant {
    fn codec(self) -> &'static Encoding {
        match self {
            Self::Gbk => GBK,
            Self::Big5 => BIG5,
        }
    }

    fn is_pair(self, lead: u8, trail: u8) -> bool {
        match self {
            Self::Gbk => is_gbk_pair(lead, trail),
            Self::Big5 => is_big5_pair(lead, trail),
        }
    }
}

/// Decode a GBK or BIG5 byte sequence. Never fails.
///
/// ASCII bytes pass through; every step consumes exactly one or two bytes.
pub fn decode_legacy_cjk(bytes: &[u8], variant: CjkVariant) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let lead = bytes[i];
        if lead <= 0x7F {
            out.push(char::from(lead));
            i += 1;
            continue;
        }
        match bytes.get(i + 1) {
            Some(&trail) if variant.is_pair(lead, trail) => {
                push_pair(&mut out, variant, lead, trail);
                i += 2;
            }
            _ => {
                out.push(UNMAPPABLE);
                i += 1;
            }
        }
    }
    out
}

fn push_pair(out: &mut String, variant: CjkVariant, lead: u8, trail: u8) {
    let pair = [lead, trail];
    match variant
        .codec()
        .decode_without_bom_handling_and_without_replacement(&pair)
    {
        Some(decoded) if !decoded.is_empty() => out.push_str(&decoded),
        _ => out.push(widen(lead, trail)),
    }
}

/// Interpret the pair as a big-endian 16-bit code point.
fn widen(lead: u8, trail: u8) -> char {
    char::from_u32(u32::from(u16::from_be_bytes([lead, trail]))).unwrap_or(UNMAPPABLE)
}
