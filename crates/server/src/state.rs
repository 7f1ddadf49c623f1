use std::sync::Arc;

use sea_orm::DatabaseConnection;

use configs::StorageConfig;
use service::cliente::{ClienteService, SeaOrmClienteRepository};
use service::upload::{LocalUploadFileService, UploadFileService};

pub type AppClienteService = ClienteService<SeaOrmClienteRepository>;

/// Shared handler state.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub clientes: AppClienteService,
}

impl ServerState {
    /// Wire the SeaORM repository and the local upload store.
    pub fn new(db: DatabaseConnection, storage: &StorageConfig) -> Self {
        Self::from_parts(db, Arc::new(LocalUploadFileService::new(storage)))
    }

    /// Same wiring with a caller-provided photo store.
    pub fn from_parts(db: DatabaseConnection, uploads: Arc<dyn UploadFileService>) -> Self {
        let repo = Arc::new(SeaOrmClienteRepository::new(db.clone()));
        Self { db, clientes: ClienteService::new(repo, uploads) }
    }
}
