//! The file-fetch boundary.
//!
//! The engine only ever sees resolved bytes. Where they come from (an object
//! store, an HTTP API, a directory) is the collaborator's business.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PreviewError, Result};

/// What the dataset layer knows about an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub original_name: String,
    pub content_type: Option<String>,
}

impl FileMetadata {
    pub fn new(original_name: impl Into<String>, content_type: Option<String>) -> Self {
        Self {
            original_name: original_name.into(),
            content_type,
        }
    }
}

/// Bytes returned by a provider, with the content type it declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    pub bytes: Vec<u8>,
    pub declared_content_type: Option<String>,
}

/// Resolves a file id to its bytes.
pub trait FileBytesProvider {
    fn fetch(&self, file_id: &str) -> Result<FetchedFile>;
}

/// Serves files from a directory; the file id is a relative path.
#[derive(Debug, Clone)]
pub struct FsFileSource {
    root: PathBuf,
}

impl FsFileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path for `file_id`, refusing absolute ids and any `..` component.
    fn resolve(&self, file_id: &str) -> Result<PathBuf> {
        let relative = Path::new(file_id);
        let safe = !file_id.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !safe {
            return Err(PreviewError::InvalidFileId(file_id.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl FileBytesProvider for FsFileSource {
    fn fetch(&self, file_id: &str) -> Result<FetchedFile> {
        let path = self.resolve(file_id)?;
        let bytes = std::fs::read(&path).map_err(|e| PreviewError::io(&path, e))?;
        debug!(path = %path.display(), size = bytes.len(), "Fetched file");
        Ok(FetchedFile {
            bytes,
            declared_content_type: None,
        })
    }
}
