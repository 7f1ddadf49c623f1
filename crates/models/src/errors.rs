use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// Per-field messages, one entry per failed constraint.
    #[error("invalid fields: {}", .0.join("; "))]
    InvalidFields(Vec<String>),
    #[error("database error: {0}")]
    Db(String),
}
