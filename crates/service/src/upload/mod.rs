//! File Storage Service for cliente photos.
//!
//! Resolves logical photo names under a configured upload root, stores
//! uploads under randomized names, deletes superseded files and falls back
//! to a placeholder image when a photo cannot be loaded.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncRead;

pub mod local;

pub use local::LocalUploadFileService;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// The placeholder image is unusable; this is a configuration problem.
    #[error("placeholder unavailable: {0}")]
    Placeholder(String),
}

/// A readable file plus the name announced in `Content-Disposition`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhotoResource {
    pub path: PathBuf,
    pub filename: String,
}

/// Outcome of a photo load: the requested file, or the placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadedPhoto {
    Found(PhotoResource),
    Fallback(PhotoResource),
}

impl LoadedPhoto {
    pub fn resource(&self) -> &PhotoResource {
        match self {
            LoadedPhoto::Found(r) | LoadedPhoto::Fallback(r) => r,
        }
    }

    pub fn into_resource(self) -> PhotoResource {
        match self {
            LoadedPhoto::Found(r) | LoadedPhoto::Fallback(r) => r,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, LoadedPhoto::Fallback(_))
    }
}

#[async_trait]
pub trait UploadFileService: Send + Sync {
    /// Join the upload root and `logical_name`. No existence check.
    fn resolve_path(&self, logical_name: &str) -> PathBuf;

    /// Load a photo, substituting the placeholder when it is missing or unreadable.
    async fn load(&self, logical_name: &str) -> Result<LoadedPhoto, StorageError>;

    /// Copy `content` under a fresh `<uuid>_<name>` and return that name.
    /// A partially written file may remain if the copy fails.
    async fn store(
        &self,
        content: &mut (dyn AsyncRead + Unpin + Send),
        original_filename: &str,
    ) -> Result<String, StorageError>;

    /// Delete a stored photo. `Ok(true)` iff a file was removed; absent or
    /// empty names and missing files are `Ok(false)`.
    async fn delete(&self, logical_name: Option<&str>) -> Result<bool, StorageError>;
}

/// Final path component of an uploaded file name with all whitespace removed.
pub fn sanitize_filename(original: &str) -> String {
    let last = original
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    last.chars().filter(|c| !c.is_whitespace()).collect()
}
