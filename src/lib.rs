//! `peekdoc` — the decoding engine behind document previews.
//!
//! Given uploaded file bytes, this crate guesses legacy character encodings,
//! decodes GBK/BIG5, extracts displayable HTML from MHTML archives, and
//! routes files to format-specific renderers that produce serializable
//! preview descriptors.

pub mod charset;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod preview;
pub mod source;

pub use charset::{decode_legacy_cjk, decode_text, detect_charset};
pub use error::{PreviewError, Result};
pub use model::charset::{CharsetGuess, CjkVariant};
pub use model::document::{DecodedDocument, MhtmlOutcome};
pub use model::preview::{PreviewDescriptor, PreviewKind};
pub use parser::{decode_mhtml, decode_mhtml_with, MhtmlOptions};
pub use preview::{decode_document, render, resolve_preview_kind, PreviewEngine, RenderInput};
pub use source::{FetchedFile, FileBytesProvider, FileMetadata, FsFileSource};
