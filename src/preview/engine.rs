//! Resolver and renderers behind the input-size guard.

use tracing::{debug, info};

use crate::charset::decode_text;
use crate::config::PreviewConfig;
use crate::error::{PreviewError, Result};
use crate::model::document::DecodedDocument;
use crate::model::preview::{PreviewDescriptor, PreviewKind};
use crate::parser::header::charset_param;
use crate::parser::mhtml::{decode_mhtml_with, MhtmlOptions};
use crate::source::{FileBytesProvider, FileMetadata};

use super::render::{render_with, RenderInput};
use super::resolver::{mime_for_extension, resolve_preview_kind, FileFacts};

/// Produces preview descriptors according to a [`PreviewConfig`].
#[derive(Debug, Clone, Default)]
pub struct PreviewEngine {
    config: PreviewConfig,
}

impl PreviewEngine {
    pub fn new(config: PreviewConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Resolve and render one file.
    ///
    /// Only the size guard can fail; everything past it degrades instead.
    pub fn preview(&self, metadata: &FileMetadata, bytes: &[u8]) -> Result<PreviewDescriptor> {
        self.check_size(bytes.len())?;
        let content_type = metadata.content_type.as_deref();
        let kind = resolve_preview_kind(&metadata.original_name, content_type);
        info!(
            file = %metadata.original_name,
            kind = %kind,
            size = bytes.len(),
            "Building preview"
        );
        let input = RenderInput::new(&metadata.original_name, bytes, content_type);
        Ok(render_with(kind, &input, &self.config.render_options()))
    }

    /// Fetch `file_id` from `provider` and preview it.
    ///
    /// The metadata content type wins over the one the provider declared.
    pub fn preview_from(
        &self,
        provider: &dyn FileBytesProvider,
        file_id: &str,
        metadata: &FileMetadata,
    ) -> Result<PreviewDescriptor> {
        let fetched = provider.fetch(file_id)?;
        let metadata = FileMetadata {
            original_name: metadata.original_name.clone(),
            content_type: metadata
                .content_type
                .clone()
                .or(fetched.declared_content_type),
        };
        self.preview(&metadata, &fetched.bytes)
    }

    /// Size-guarded [`decode_document`] using the configured MHTML options.
    pub fn decode_document(
        &self,
        file_name: &str,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<DecodedDocument> {
        self.check_size(bytes.len())?;
        Ok(decode_document_with(
            file_name,
            bytes,
            content_type,
            &self.config.mhtml_options(),
        ))
    }

    fn check_size(&self, size: usize) -> Result<()> {
        let limit = self.config.limits.max_input_size;
        if size > limit {
            debug!(size, limit, "Input over preview limit");
            return Err(PreviewError::InputTooLarge { size, limit });
        }
        Ok(())
    }
}

/// Decode a file straight to text: MHTML archives to their HTML, anything
/// else through charset detection.
pub fn decode_document(
    file_name: &str,
    bytes: &[u8],
    content_type: Option<&str>,
) -> DecodedDocument {
    decode_document_with(file_name, bytes, content_type, &MhtmlOptions::default())
}

fn decode_document_with(
    file_name: &str,
    bytes: &[u8],
    content_type: Option<&str>,
    options: &MhtmlOptions,
) -> DecodedDocument {
    let kind = resolve_preview_kind(file_name, content_type);
    let (mime_type, text) = match kind {
        PreviewKind::Mhtml => (
            "text/html".to_string(),
            decode_mhtml_with(bytes, content_type, options).into_html(),
        ),
        _ => {
            let facts = FileFacts::new(file_name, content_type);
            let mime_type = if kind == PreviewKind::Html {
                "text/html".to_string()
            } else if !facts.content_type.is_empty() {
                facts.content_type
            } else {
                mime_for_extension(&facts.extension)
                    .unwrap_or("text/plain")
                    .to_string()
            };
            let declared = content_type.and_then(charset_param);
            (mime_type, decode_text(bytes, declared.as_deref()))
        }
    };
    DecodedDocument {
        mime_type,
        text,
        source_file_name: file_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::preview::{DescriptorKind, Payload};
    use crate::source::FetchedFile;

    struct Fixed(Vec<u8>);

    impl FileBytesProvider for Fixed {
        fn fetch(&self, _file_id: &str) -> Result<FetchedFile> {
            Ok(FetchedFile {
                bytes: self.0.clone(),
                declared_content_type: Some("text/csv".to_string()),
            })
        }
    }

    fn small_engine(limit: usize) -> PreviewEngine {
        let mut config = PreviewConfig::default();
        config.limits.max_input_size = limit;
        PreviewEngine::new(config)
    }

    #[test]
    fn test_size_guard() {
        let engine = small_engine(4);
        let meta = FileMetadata::new("a.txt", None);
        assert!(matches!(
            engine.preview(&meta, b"12345"),
            Err(PreviewError::InputTooLarge { size: 5, limit: 4 })
        ));
        assert!(engine.preview(&meta, b"1234").is_ok());
    }

    #[test]
    fn test_extension_beats_generic_type() {
        let engine = PreviewEngine::default();
        let meta = FileMetadata::new("data.json", Some("text/plain".to_string()));
        let desc = engine.preview(&meta, br#"{"k":[1,2]}"#).expect("preview");
        assert_eq!(desc.kind, DescriptorKind::Code);
    }

    #[test]
    fn test_preview_from_uses_declared_type_when_metadata_has_none() {
        let engine = PreviewEngine::default();
        let meta = FileMetadata::new("upload", None);
        let desc = engine
            .preview_from(&Fixed(b"a,b\n1,2".to_vec()), "id-1", &meta)
            .expect("preview");
        assert!(matches!(desc.payload, Payload::Table { .. }));
    }

    #[test]
    fn test_decode_document_plain() {
        let doc = decode_document("notes.txt", "héllo".as_bytes(), None);
        assert_eq!(doc.mime_type, "text/plain");
        assert_eq!(doc.text, "héllo");
        assert_eq!(doc.source_file_name, "notes.txt");
    }

    #[test]
    fn test_decode_document_mhtml() {
        let doc = decode_document("page.mht", b"x <html><body>hi</body></html>", None);
        assert_eq!(doc.mime_type, "text/html");
        assert_eq!(doc.text, "<html><body>hi</body></html>");
    }

    #[test]
    fn test_engine_decode_document_guarded() {
        let engine = small_engine(1);
        assert!(engine.decode_document("a.txt", b"ab", None).is_err());
    }
}
