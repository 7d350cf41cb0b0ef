//! Byte-level charset guessing: BOM first, then a pair-counting heuristic.

use tracing::trace;

use crate::model::charset::CharsetGuess;

/// Counters collected by the heuristic scan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PairCounts {
    pub gbk: usize,
    pub big5: usize,
    pub utf8: usize,
}

/// Guess the charset of `bytes`.
///
/// The hint is advisory: it is normalized and logged but the heuristic scan
/// decides. Always returns a value; ambiguous input resolves to UTF-8.
pub fn detect_charset(bytes: &[u8], hint: Option<&str>) -> CharsetGuess {
    if let Some(bom) = detect_bom(bytes) {
        return bom;
    }

    let advisory = hint.and_then(CharsetGuess::from_label);
    let counts = count_pairs(bytes);
    let guess = pick(counts);
    trace!(
        hint = ?advisory,
        gbk = counts.gbk,
        big5 = counts.big5,
        utf8 = counts.utf8,
        guess = %guess,
        "Charset heuristic"
    );
    guess
}

/// Charset announced by a leading byte order mark, if any.
pub fn detect_bom(bytes: &[u8]) -> Option<CharsetGuess> {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        Some(CharsetGuess::Utf8)
    } else if bytes.starts_with(&[0xFE, 0xFF]) {
        Some(CharsetGuess::Utf16Be)
    } else if bytes.starts_with(&[0xFF, 0xFE]) {
        Some(CharsetGuess::Utf16Le)
    } else {
        None
    }
}

pub(crate) fn is_gbk_pair(lead: u8, trail: u8) -> bool {
    (0x81..=0xFE).contains(&lead) && (0x40..=0xFE).contains(&trail) && trail != 0x7F
}

pub(crate) fn is_big5_pair(lead: u8, trail: u8) -> bool {
    (0xA1..=0xFE).contains(&lead)
        && ((0x40..=0x7E).contains(&trail) || (0xA1..=0xFE).contains(&trail))
}

fn is_utf8_continuation(lead: u8, next: u8) -> bool {
    lead >= 0x80 && (0x80..=0xBF).contains(&next)
}

/// Walk the buffer and count candidate byte pairs.
///
/// Tests run in order UTF-8 continuation, GBK, BIG5; the first match is
/// counted and the cursor advances by two, otherwise by one. BIG5 pairs fall
/// inside the GBK ranges, so undeclared BIG5 text is counted as GBK.
pub fn count_pairs(bytes: &[u8]) -> PairCounts {
    let mut counts = PairCounts::default();
    let mut i = 0;
    while i < bytes.len() {
        let Some(&next) = bytes.get(i + 1) else {
            break;
        };
        let lead = bytes[i];
        if is_utf8_continuation(lead, next) {
            counts.utf8 += 1;
            i += 2;
        } else if is_gbk_pair(lead, next) {
            counts.gbk += 1;
            i += 2;
        } else if is_big5_pair(lead, next) {
            counts.big5 += 1;
            i += 2;
        } else {
            i += 1;
        }
    }
    counts
}

fn pick(counts: PairCounts) -> CharsetGuess {
    let PairCounts { gbk, big5, utf8 } = counts;
    if gbk + big5 + utf8 == 0 {
        return CharsetGuess::Utf8;
    }
    if gbk > big5 && gbk > utf8 {
        CharsetGuess::Gbk
    } else if big5 > gbk && big5 > utf8 {
        // Not reached from `count_pairs`, whose BIG5 ranges lie inside GBK's.
        CharsetGuess::Big5
    } else {
        // UTF-8 either dominates or the scan tied; both resolve the same way.
        CharsetGuess::Utf8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bom_overrides_hint() {
        let bytes = [0xEF, 0xBB, 0xBF, 0x68, 0x69];
        assert_eq!(detect_charset(&bytes, Some("gbk")), CharsetGuess::Utf8);
    }

    #[test]
    fn test_utf16_boms() {
        assert_eq!(detect_charset(&[0xFE, 0xFF, 0x00, 0x41], None), CharsetGuess::Utf16Be);
        assert_eq!(
            detect_charset(&[0xFF, 0xFE, 0x41, 0x00], Some("big5")),
            CharsetGuess::Utf16Le
        );
    }

    #[test]
    fn test_bom_wins_over_cjk_content() {
        // GBK-looking payload behind a UTF-16LE BOM.
        let bytes = [0xFF, 0xFE, 0xD6, 0xD0, 0xCE, 0xC4];
        assert_eq!(detect_charset(&bytes, None), CharsetGuess::Utf16Le);
    }

    #[test]
    fn test_ascii_is_utf8() {
        assert_eq!(detect_charset(b"plain ascii text", None), CharsetGuess::Utf8);
        assert_eq!(detect_charset(b"plain ascii text", Some("big5")), CharsetGuess::Utf8);
        assert_eq!(detect_charset(b"", None), CharsetGuess::Utf8);
    }

    #[test]
    fn test_gbk_text_detected() {
        // "中文你好" in GBK
        let bytes = [0xD6, 0xD0, 0xCE, 0xC4, 0xC4, 0xE3, 0xBA, 0xC3];
        assert_eq!(detect_charset(&bytes, None), CharsetGuess::Gbk);
    }

    #[test]
    fn test_gbk_hint_does_not_override_heuristic() {
        // 0x80 leads only ever count as UTF-8 continuations.
        let bytes = [0x80, 0x80, 0x80, 0x81];
        assert_eq!(
            count_pairs(&bytes),
            PairCounts {
                gbk: 0,
                big5: 0,
                utf8: 2
            }
        );
        assert_eq!(detect_charset(&bytes, Some("gbk")), CharsetGuess::Utf8);
    }

    #[test]
    fn test_utf8_chinese_detected() {
        // "中文" in UTF-8: E4 B8 | AD E6 | 96 87
        let bytes = "中文".as_bytes();
        let counts = count_pairs(bytes);
        assert_eq!(counts.utf8, 2);
        assert_eq!(counts.gbk, 1);
        assert_eq!(detect_charset(bytes, None), CharsetGuess::Utf8);
    }

    #[test]
    fn test_tie_defaults_to_utf8() {
        // One UTF-8 continuation pair, one GBK pair.
        let bytes = [0xC3, 0xA9, 0xD6, 0xD0];
        assert_eq!(
            count_pairs(&bytes),
            PairCounts {
                gbk: 1,
                big5: 0,
                utf8: 1
            }
        );
        assert_eq!(detect_charset(&bytes, None), CharsetGuess::Utf8);
    }

    #[test]
    fn test_pair_ranges() {
        assert!(is_gbk_pair(0x81, 0x40));
        assert!(!is_gbk_pair(0x81, 0x7F));
        assert!(!is_gbk_pair(0x80, 0x40));
        assert!(is_big5_pair(0xA1, 0x7E));
        assert!(!is_big5_pair(0xA1, 0x80));
        assert!(!is_big5_pair(0x90, 0xA1));
    }

    #[test]
    fn test_big5_pairs_counted_as_gbk() {
        // 一乙 in BIG5
        let counts = count_pairs(&[0xA4, 0x40, 0xA4, 0x41]);
        assert_eq!(counts.big5, 0);
        assert_eq!(counts.gbk, 2);
    }

    #[test]
    fn test_pick_big5_majority() {
        let counts = PairCounts {
            gbk: 1,
            big5: 3,
            utf8: 2,
        };
        assert_eq!(pick(counts), CharsetGuess::Big5);
        assert_eq!(pick(PairCounts { big5: 2, ..counts }), CharsetGuess::Utf8);
    }

    #[test]
    fn test_trailing_lone_byte_ignored() {
        assert_eq!(count_pairs(&[b'a', 0xD6]), PairCounts::default());
    }
}
