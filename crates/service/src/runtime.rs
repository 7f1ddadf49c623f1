//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

use configs::StorageConfig;

/// Ensure the upload root exists; warn when the placeholder is missing.
pub async fn ensure_env(storage: &StorageConfig) -> anyhow::Result<()> {
    common::env::ensure_env(&storage.upload_dir, &storage.placeholder).await
}
