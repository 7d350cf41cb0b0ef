//! MIME handling: header blocks, transfer encodings, multipart splitting, and the MHTML pipeline.

pub mod header;
pub mod mhtml;
pub mod multipart;
pub mod transfer;

pub use mhtml::{decode_mhtml, decode_mhtml_with, MhtmlOptions};
