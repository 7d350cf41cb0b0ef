//! Charset handling: detection, legacy CJK decoding, and bytes-to-text dispatch.

pub mod decode;
pub mod detect;
pub mod legacy;

pub use decode::{decode_text, decode_with};
pub use detect::detect_charset;
pub use legacy::decode_legacy_cjk;
