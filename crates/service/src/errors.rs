use thiserror::Error;

use models::errors::ModelError;

use crate::upload::StorageError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    /// Field-level messages, e.g. `El campo 'nombre' no puede estar vacio`.
    #[error("invalid fields: {}", .0.join("; "))]
    Invalid(Vec<String>),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ServiceError {
    pub fn cliente_not_found(id: i32) -> Self {
        Self::NotFound(format!("El cliente ID: {} no existe en la base de datos!", id))
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::InvalidFields(errs) => Self::Invalid(errs),
            ModelError::Db(msg) => Self::Db(msg),
        }
    }
}
