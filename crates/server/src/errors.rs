use axum::extract::rejection::JsonRejection;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use service::errors::ServiceError;

pub const MSG_CONSULTA: &str = "Error al realizar la consulta en la base de datos";
pub const MSG_INSERT: &str = "Error al realizar el insert en la base de datos";
pub const MSG_UPDATE: &str = "Error al actualizar el cliente en la base de datos";
pub const MSG_DELETE: &str = "Error al eliminar el cliente de la base de datos";
pub const MSG_UPLOAD: &str = "Error al subir la imagen del cliente";
pub const MSG_FACTURA_INSERT: &str = "Error al crear la factura en la base de datos";
pub const MSG_FACTURA_DELETE: &str = "Error al eliminar la factura de la base de datos";

/// HTTP error with the Spanish JSON bodies the frontend expects:
/// 400 `{errors}`, 404 `{mensaje}`, 500 `{mensaje, error}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {}", .0.join("; "))]
    Invalid(Vec<String>),
    #[error("{0}")]
    NotFound(String),
    #[error("{mensaje}: {error}")]
    Internal { mensaje: String, error: String },
    /// 提取器拒绝请求时保留其状态码（例如超过大小限制时的 413）
    #[error("rejected ({status}): {}", .errors.join("; "))]
    Rejected { status: StatusCode, errors: Vec<String> },
}

impl ApiError {
    /// Map a service failure; `mensaje` summarizes a 500 for the operation at hand.
    pub fn from_service(e: ServiceError, mensaje: &str) -> Self {
        match e {
            ServiceError::Validation(msg) => ApiError::Invalid(vec![msg]),
            ServiceError::Invalid(errs) => ApiError::Invalid(errs),
            ServiceError::NotFound(msg) => ApiError::NotFound(msg),
            ServiceError::Db(err) => ApiError::Internal { mensaje: mensaje.to_string(), error: err },
            ServiceError::Storage(err) => ApiError::Internal { mensaje: mensaje.to_string(), error: err.to_string() },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self {
        ApiError::Invalid(vec![r.body_text()])
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::Rejected { status: e.status(), errors: vec![e.body_text()] }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Invalid(errors) => (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response(),
            ApiError::Rejected { status, errors } => (status, Json(json!({ "errors": errors }))).into_response(),
            ApiError::NotFound(mensaje) => (StatusCode::NOT_FOUND, Json(json!({ "mensaje": mensaje }))).into_response(),
            ApiError::Internal { mensaje, error } => {
                error!(%mensaje, %error, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "mensaje": mensaje, "error": error }))).into_response()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
