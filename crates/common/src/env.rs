//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::{info, warn};

/// Ensure the upload root exists; warn when the placeholder image is missing,
/// since every missing photo would then fail to render.
pub async fn ensure_env(upload_dir: &str, placeholder: &str) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {upload_dir}: {e}"))?;
    info!(%upload_dir, "upload directory ready");
    if tokio::fs::metadata(placeholder).await.is_err() {
        warn!(%placeholder, "placeholder image not found; missing photos will return 500");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_env_creates_nested_upload_dir() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let dir = tmp.path().join("a/b/uploads");
        let dir_str = dir.to_string_lossy().to_string();
        ensure_env(&dir_str, "does-not-exist.png").await?;
        assert!(tokio::fs::metadata(&dir).await?.is_dir());
        Ok(())
    }
}
