use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::{
    fs,
    io::{AsyncRead, AsyncWriteExt},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use common::metrics::{PHOTOS_DELETED_TOTAL, PHOTOS_STORED_TOTAL, PLACEHOLDER_SERVED_TOTAL};
use configs::StorageConfig;

use super::{sanitize_filename, LoadedPhoto, PhotoResource, StorageError, UploadFileService};

/// Photos on the local filesystem under a single upload root.
#[derive(Clone, Debug)]
pub struct LocalUploadFileService {
    root: PathBuf,
    placeholder: PathBuf,
}

impl LocalUploadFileService {
    pub fn new(cfg: &StorageConfig) -> Self {
        Self::from_paths(&cfg.upload_dir, &cfg.placeholder)
    }

    /// Relative paths are anchored at the current working directory.
    pub fn from_paths(root: impl AsRef<Path>, placeholder: impl AsRef<Path>) -> Self {
        Self { root: absolutize(root.as_ref()), placeholder: absolutize(placeholder.as_ref()) }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn placeholder_resource(&self) -> Result<PhotoResource, StorageError> {
        let filename = self
            .placeholder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| StorageError::Placeholder(format!("{} has no file name", self.placeholder.display())))?;
        Ok(PhotoResource { path: self.placeholder.clone(), filename })
    }
}

fn absolutize(p: &Path) -> PathBuf {
    if p.is_absolute() {
        return p.to_path_buf();
    }
    std::env::current_dir().map(|cwd| cwd.join(p)).unwrap_or_else(|_| p.to_path_buf())
}

/// A single plain path component: no separators, no `.`/`..`.
fn is_safe_name(name: &str) -> bool {
    if name.contains('/') || name.contains('\\') || name.contains('\0') {
        return false;
    }
    let mut comps = Path::new(name).components();
    matches!((comps.next(), comps.next()), (Some(Component::Normal(_)), None))
}

async fn is_readable_file(path: &Path) -> bool {
    match fs::metadata(path).await {
        Ok(meta) if meta.is_file() => fs::File::open(path).await.is_ok(),
        _ => false,
    }
}

#[async_trait]
impl UploadFileService for LocalUploadFileService {
    fn resolve_path(&self, logical_name: &str) -> PathBuf {
        self.root.join(logical_name)
    }

    async fn load(&self, logical_name: &str) -> Result<LoadedPhoto, StorageError> {
        if is_safe_name(logical_name) {
            let path = self.resolve_path(logical_name);
            debug!(path = %path.display(), "loading photo");
            if is_readable_file(&path).await {
                return Ok(LoadedPhoto::Found(PhotoResource { path, filename: logical_name.to_string() }));
            }
        }

        warn!(nombre_foto = %logical_name, "no se pudo cargar la imagen; serving placeholder");
        let placeholder = self.placeholder_resource()?;
        if !is_readable_file(&placeholder.path).await {
            return Err(StorageError::Placeholder(format!("{} is not readable", placeholder.path.display())));
        }
        PLACEHOLDER_SERVED_TOTAL.inc();
        Ok(LoadedPhoto::Fallback(placeholder))
    }

    async fn store(
        &self,
        content: &mut (dyn AsyncRead + Unpin + Send),
        original_filename: &str,
    ) -> Result<String, StorageError> {
        let nombre = format!("{}_{}", Uuid::new_v4(), sanitize_filename(original_filename));
        let path = self.resolve_path(&nombre);
        fs::create_dir_all(&self.root).await?;

        // create_new: a generated name must never replace an existing file
        let mut file = fs::OpenOptions::new().write(true).create_new(true).open(&path).await?;
        let bytes = tokio::io::copy(content, &mut file).await?;
        file.flush().await?;

        PHOTOS_STORED_TOTAL.inc();
        info!(path = %path.display(), bytes, "photo stored");
        Ok(nombre)
    }

    async fn delete(&self, logical_name: Option<&str>) -> Result<bool, StorageError> {
        let Some(name) = logical_name.filter(|n| !n.is_empty()) else {
            return Ok(false);
        };
        if !is_safe_name(name) {
            warn!(nombre_foto = %name, "refusing to delete photo with unsafe name");
            return Ok(false);
        }
        let path = self.resolve_path(name);
        if !is_readable_file(&path).await {
            debug!(path = %path.display(), "nothing to delete");
            return Ok(false);
        }
        match fs::remove_file(&path).await {
            Ok(()) => {
                PHOTOS_DELETED_TOTAL.inc();
                info!(path = %path.display(), "photo deleted");
                Ok(true)
            }
            // removed concurrently between the check and the unlink
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-image-body";

    async fn service_with_placeholder() -> anyhow::Result<(tempfile::TempDir, LocalUploadFileService)> {
        let tmp = tempfile::tempdir()?;
        let placeholder = tmp.path().join("static/images/no-usuario.png");
        fs::create_dir_all(placeholder.parent().unwrap()).await?;
        fs::write(&placeholder, b"placeholder").await?;
        let svc = LocalUploadFileService::from_paths(tmp.path().join("uploads"), &placeholder);
        Ok((tmp, svc))
    }

    #[test]
    fn resolve_path_is_a_pure_join() {
        let svc = LocalUploadFileService::from_paths("/srv/uploads", "/srv/static/no-usuario.png");
        assert_eq!(svc.resolve_path("abc_foto.png"), PathBuf::from("/srv/uploads/abc_foto.png"));
        assert_eq!(svc.resolve_path("missing.png"), PathBuf::from("/srv/uploads/missing.png"));
    }

    #[test]
    fn relative_root_is_anchored_at_cwd() {
        let svc = LocalUploadFileService::from_paths("uploads", "static/images/no-usuario.png");
        assert!(svc.root().is_absolute());
        assert!(svc.root().ends_with("uploads"));
    }

    #[test]
    fn unsafe_names_are_detected() {
        assert!(is_safe_name("abc_foto.png"));
        assert!(!is_safe_name(""));
        assert!(!is_safe_name(".."));
        assert!(!is_safe_name("."));
        assert!(!is_safe_name("../secret"));
        assert!(!is_safe_name("a/b.png"));
        assert!(!is_safe_name("a\\b.png"));
    }

    #[tokio::test]
    async fn store_generates_unique_readable_files() -> anyhow::Result<()> {
        let (_tmp, svc) = service_with_placeholder().await?;
        let mut names = HashSet::new();
        for _ in 0..5 {
            let mut content: &[u8] = PNG_BYTES;
            let name = svc.store(&mut content, "My Pic.png").await?;
            assert!(name.ends_with("_MyPic.png"));
            assert_eq!(fs::read(svc.resolve_path(&name)).await?, PNG_BYTES);
            assert!(names.insert(name));
        }
        Ok(())
    }

    #[tokio::test]
    async fn store_creates_missing_root() -> anyhow::Result<()> {
        let (_tmp, svc) = service_with_placeholder().await?;
        assert!(fs::metadata(svc.root()).await.is_err());
        let mut content: &[u8] = b"x";
        svc.store(&mut content, "a.png").await?;
        assert!(fs::metadata(svc.root()).await?.is_dir());
        Ok(())
    }

    #[tokio::test]
    async fn load_returns_found_for_stored_file() -> anyhow::Result<()> {
        let (_tmp, svc) = service_with_placeholder().await?;
        let mut content: &[u8] = PNG_BYTES;
        let name = svc.store(&mut content, "perfil.png").await?;
        match svc.load(&name).await? {
            LoadedPhoto::Found(r) => {
                assert_eq!(r.filename, name);
                assert_eq!(r.path, svc.resolve_path(&name));
            }
            other => panic!("expected Found, got {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn load_missing_or_unsafe_falls_back_to_placeholder() -> anyhow::Result<()> {
        let (_tmp, svc) = service_with_placeholder().await?;
        for name in ["nope.png", "../no-usuario.png", ""] {
            let loaded = svc.load(name).await?;
            assert!(loaded.is_fallback(), "{name} should fall back");
            assert_eq!(loaded.resource().filename, "no-usuario.png");
        }
        Ok(())
    }

    #[tokio::test]
    async fn load_fails_when_placeholder_is_broken() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let svc = LocalUploadFileService::from_paths(tmp.path().join("uploads"), tmp.path().join("gone.png"));
        let err = svc.load("nope.png").await.unwrap_err();
        assert!(matches!(err, StorageError::Placeholder(_)));

        let svc = LocalUploadFileService::from_paths(tmp.path().join("uploads"), "/");
        assert!(matches!(svc.load("nope.png").await, Err(StorageError::Placeholder(_))));
        Ok(())
    }

    #[tokio::test]
    async fn delete_none_or_empty_is_a_noop() -> anyhow::Result<()> {
        let (_tmp, svc) = service_with_placeholder().await?;
        let mut content: &[u8] = b"keep";
        let name = svc.store(&mut content, "keep.png").await?;
        assert!(!svc.delete(None).await?);
        assert!(!svc.delete(Some("")).await?);
        assert!(fs::metadata(svc.resolve_path(&name)).await.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn delete_existing_then_missing() -> anyhow::Result<()> {
        let (_tmp, svc) = service_with_placeholder().await?;
        let mut content: &[u8] = b"bye";
        let name = svc.store(&mut content, "bye.png").await?;
        assert!(svc.delete(Some(name.as_str())).await?);
        assert!(fs::metadata(svc.resolve_path(&name)).await.is_err());
        assert!(!svc.delete(Some(name.as_str())).await?);
        assert!(!svc.delete(Some("never-existed.png")).await?);
        Ok(())
    }

    #[tokio::test]
    async fn delete_refuses_to_escape_root() -> anyhow::Result<()> {
        let (tmp, svc) = service_with_placeholder().await?;
        fs::create_dir_all(svc.root()).await?;
        let outside = tmp.path().join("outside.txt");
        fs::write(&outside, b"secret").await?;
        assert!(!svc.delete(Some("../outside.txt")).await?);
        assert!(fs::metadata(&outside).await.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn delete_ignores_directories() -> anyhow::Result<()> {
        let (_tmp, svc) = service_with_placeholder().await?;
        fs::create_dir_all(svc.resolve_path("subdir")).await?;
        assert!(!svc.delete(Some("subdir")).await?);
        assert!(fs::metadata(svc.resolve_path("subdir")).await?.is_dir());
        Ok(())
    }
}
