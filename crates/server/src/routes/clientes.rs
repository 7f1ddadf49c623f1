use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use common::types::Mensaje;
use models::cliente::{field_error, ClienteDto, ClienteForm};
use models::region;
use service::errors::ServiceError;
use service::pagination::Page;

use crate::errors::{ApiError, MSG_CONSULTA, MSG_DELETE, MSG_INSERT, MSG_UPDATE, MSG_UPLOAD};
use crate::state::ServerState;

/// `{mensaje, cliente}` body of create/update/upload.
#[derive(Debug, Serialize)]
pub struct ClienteResponse {
    pub mensaje: String,
    pub cliente: ClienteDto,
}

#[utoipa::path(
    get, path = "/api/clientes", tag = "clientes",
    responses(
        (status = 200, description = "All clientes ordered by id", body = [crate::openapi::ClienteDoc]),
        (status = 500, description = "Database error", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn index(State(state): State<ServerState>) -> Result<Json<Vec<ClienteDto>>, ApiError> {
    let list = state.clientes.list().await.map_err(|e| ApiError::from_service(e, MSG_CONSULTA))?;
    Ok(Json(list))
}

#[utoipa::path(
    get, path = "/api/clientes/page/{page}", tag = "clientes",
    params(("page" = u64, Path, description = "Zero-based page index")),
    responses(
        (status = 200, description = "One page of 4 clientes", body = crate::openapi::ClientePageDoc),
        (status = 500, description = "Database error", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn page(State(state): State<ServerState>, Path(page): Path<u64>) -> Result<Json<Page<ClienteDto>>, ApiError> {
    let p = state.clientes.page(page).await.map_err(|e| ApiError::from_service(e, MSG_CONSULTA))?;
    Ok(Json(p))
}

#[utoipa::path(
    get, path = "/api/clientes/{id}", tag = "clientes",
    params(("id" = i32, Path, description = "Cliente ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::ClienteDoc),
        (status = 404, description = "Not Found", body = crate::openapi::MensajeDoc),
        (status = 500, description = "Database error", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn show(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<ClienteDto>, ApiError> {
    match state.clientes.get(id).await {
        Ok(Some(c)) => Ok(Json(c)),
        Ok(None) => Err(ApiError::from_service(ServiceError::cliente_not_found(id), MSG_CONSULTA)),
        Err(e) => Err(ApiError::from_service(e, MSG_CONSULTA)),
    }
}

#[utoipa::path(
    post, path = "/api/clientes", tag = "clientes",
    request_body = crate::openapi::ClienteFormDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::ClienteResponseDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorsDoc),
        (status = 500, description = "Insert Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    body: Result<Json<ClienteForm>, JsonRejection>,
) -> Result<(StatusCode, Json<ClienteResponse>), ApiError> {
    let Json(form) = body?;
    let cliente = state.clientes.create(&form).await.map_err(|e| ApiError::from_service(e, MSG_INSERT))?;
    Ok((
        StatusCode::CREATED,
        Json(ClienteResponse { mensaje: "El cliente ha sido creado con éxito!".into(), cliente }),
    ))
}

#[utoipa::path(
    put, path = "/api/clientes/{id}", tag = "clientes",
    params(("id" = i32, Path, description = "Cliente ID")),
    request_body = crate::openapi::ClienteFormDoc,
    responses(
        (status = 201, description = "Updated", body = crate::openapi::ClienteResponseDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorsDoc),
        (status = 404, description = "Not Found", body = crate::openapi::MensajeDoc),
        (status = 500, description = "Update Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    body: Result<Json<ClienteForm>, JsonRejection>,
) -> Result<(StatusCode, Json<ClienteResponse>), ApiError> {
    let Json(form) = body?;
    let cliente = state.clientes.update(id, &form).await.map_err(|e| match e {
        ServiceError::NotFound(msg) => ApiError::NotFound(format!("Error: no se pudo editar, {}", lowercase_first(&msg))),
        other => ApiError::from_service(other, MSG_UPDATE),
    })?;
    Ok((
        StatusCode::CREATED,
        Json(ClienteResponse { mensaje: "El cliente ha sido actualizado con éxito!".into(), cliente }),
    ))
}

#[utoipa::path(
    delete, path = "/api/clientes/{id}", tag = "clientes",
    params(("id" = i32, Path, description = "Cliente ID")),
    responses(
        (status = 200, description = "Deleted", body = crate::openapi::MensajeDoc),
        (status = 404, description = "Not Found", body = crate::openapi::MensajeDoc),
        (status = 500, description = "Delete Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<Mensaje>, ApiError> {
    let report = state.clientes.delete(id).await.map_err(|e| ApiError::from_service(e, MSG_DELETE))?;
    let mensaje = match report.foto_error {
        None => "El cliente eliminado con éxito!".to_string(),
        Some(err) => format!("El cliente eliminado con éxito! (no se pudo eliminar su foto: {})", err),
    };
    Ok(Json(Mensaje::new(mensaje)))
}

#[utoipa::path(
    post, path = "/api/clientes/uploads", tag = "clientes",
    request_body(content = crate::openapi::UploadFormDoc, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Photo stored", body = crate::openapi::ClienteResponseDoc),
        (status = 400, description = "Missing or empty file or id", body = crate::openapi::ErrorsDoc),
        (status = 404, description = "Not Found", body = crate::openapi::MensajeDoc),
        (status = 500, description = "Upload Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn upload(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ClienteResponse>), ApiError> {
    let mut archivo: Option<(String, Vec<u8>)> = None;
    let mut id_raw: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("archivo") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                archivo = Some((filename, data.to_vec()));
            }
            Some("id") => id_raw = Some(field.text().await?),
            other => warn!(field = ?other, "ignoring unexpected multipart field"),
        }
    }

    let mut errs = Vec::new();
    let id = match id_raw.as_deref().map(str::trim) {
        None | Some("") => { errs.push(field_error("id", "no puede estar vacio")); None }
        Some(raw) => match raw.parse::<i32>() {
            Ok(id) => Some(id),
            Err(_) => { errs.push(field_error("id", "debe ser un número entero")); None }
        },
    };
    let archivo = match archivo {
        Some((name, data)) if !data.is_empty() => Some((name, data)),
        _ => { errs.push(field_error("archivo", "no puede estar vacio")); None }
    };
    let (Some(id), Some((filename, data))) = (id, archivo) else {
        return Err(ApiError::Invalid(errs));
    };

    let (cliente, nombre) = state
        .clientes
        .upload_photo(id, &data, &filename)
        .await
        .map_err(|e| ApiError::from_service(e, MSG_UPLOAD))?;
    info!(id, foto = %nombre, "photo uploaded");
    Ok((
        StatusCode::CREATED,
        Json(ClienteResponse { mensaje: format!("Se ha subido correctamente la imagen: {}", nombre), cliente }),
    ))
}

#[utoipa::path(
    get, path = "/api/clientes/regiones", tag = "clientes",
    responses(
        (status = 200, description = "All regions", body = [crate::openapi::RegionDoc]),
        (status = 500, description = "Database error", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn regiones(State(state): State<ServerState>) -> Result<Json<Vec<region::Model>>, ApiError> {
    let list = state.clientes.regiones().await.map_err(|e| ApiError::from_service(e, MSG_CONSULTA))?;
    Ok(Json(list))
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
