#![cfg(test)]
use std::sync::Arc;

use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

use models::db::{connect_with_config, sqlite_memory_config};

use crate::upload::{LocalUploadFileService, UploadFileService};

/// A freshly migrated private SQLite database; every call starts empty.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = connect_with_config(&sqlite_memory_config()).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Upload service rooted in a temp dir, with a placeholder image in place.
/// Keep the `TempDir` alive for the duration of the test.
pub async fn temp_uploads() -> Result<(tempfile::TempDir, Arc<dyn UploadFileService>), anyhow::Error> {
    let tmp = tempfile::tempdir()?;
    let placeholder = tmp.path().join("static").join("no-usuario.png");
    tokio::fs::create_dir_all(tmp.path().join("static")).await?;
    tokio::fs::write(&placeholder, b"placeholder").await?;
    let svc = LocalUploadFileService::from_paths(tmp.path().join("uploads"), &placeholder);
    Ok((tmp, Arc::new(svc)))
}
