//! Core data model types for charsets, MIME parts, decoded documents and previews.

pub mod charset;
pub mod document;
pub mod preview;
