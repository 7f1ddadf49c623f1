use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use models::factura::{FacturaDto, FacturaForm};
use models::producto;
use service::factura_service::{self, FiltroProducto};

use crate::errors::{ApiError, MSG_CONSULTA, MSG_FACTURA_DELETE, MSG_FACTURA_INSERT};
use crate::state::ServerState;

/// `{mensaje, factura}` body of create.
#[derive(Debug, Serialize)]
pub struct FacturaResponse {
    pub mensaje: String,
    pub factura: FacturaDto,
}

#[derive(Debug, Default, Deserialize)]
pub struct FiltroQuery {
    pub modo: Option<String>,
}

#[utoipa::path(
    get, path = "/api/facturas/{id}", tag = "facturas",
    params(("id" = i32, Path, description = "Factura ID")),
    responses(
        (status = 200, description = "Factura with items and total", body = crate::openapi::FacturaDoc),
        (status = 404, description = "Not Found", body = crate::openapi::MensajeDoc),
        (status = 500, description = "Database error", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn show(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<FacturaDto>, ApiError> {
    let f = factura_service::get_factura(&state.db, id)
        .await
        .map_err(|e| ApiError::from_service(e, MSG_CONSULTA))?;
    Ok(Json(f))
}

#[utoipa::path(
    get, path = "/api/clientes/{id}/facturas", tag = "facturas",
    params(("id" = i32, Path, description = "Cliente ID")),
    responses(
        (status = 200, description = "Facturas of the cliente", body = [crate::openapi::FacturaDoc]),
        (status = 404, description = "Cliente not found", body = crate::openapi::MensajeDoc),
        (status = 500, description = "Database error", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn de_cliente(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<Vec<FacturaDto>>, ApiError> {
    let list = factura_service::facturas_de_cliente(&state.db, id)
        .await
        .map_err(|e| ApiError::from_service(e, MSG_CONSULTA))?;
    Ok(Json(list))
}

#[utoipa::path(
    post, path = "/api/facturas", tag = "facturas",
    request_body = crate::openapi::FacturaFormDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::FacturaResponseDoc),
        (status = 400, description = "Validation errors", body = crate::openapi::ErrorsDoc),
        (status = 500, description = "Insert Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    body: Result<Json<FacturaForm>, JsonRejection>,
) -> Result<(StatusCode, Json<FacturaResponse>), ApiError> {
    let Json(form) = body?;
    let factura = factura_service::create_factura(&state.db, &form)
        .await
        .map_err(|e| ApiError::from_service(e, MSG_FACTURA_INSERT))?;
    Ok((
        StatusCode::CREATED,
        Json(FacturaResponse { mensaje: "La factura ha sido creada con éxito!".into(), factura }),
    ))
}

#[utoipa::path(
    delete, path = "/api/facturas/{id}", tag = "facturas",
    params(("id" = i32, Path, description = "Factura ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = crate::openapi::MensajeDoc),
        (status = 500, description = "Delete Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<StatusCode, ApiError> {
    factura_service::delete_factura(&state.db, id)
        .await
        .map_err(|e| ApiError::from_service(e, MSG_FACTURA_DELETE))?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get, path = "/api/facturas/filtrar-productos/{term}", tag = "facturas",
    params(
        ("term" = String, Path, description = "Text to look for in the producto name"),
        ("modo" = Option<String>, Query, description = "`contiene` (default, case-insensitive), `empieza` (case-insensitive prefix) or `like`")
    ),
    responses(
        (status = 200, description = "Matching productos", body = [crate::openapi::ProductoDoc]),
        (status = 400, description = "Unknown modo", body = crate::openapi::ErrorsDoc),
        (status = 500, description = "Database error", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn filtrar_productos(
    State(state): State<ServerState>,
    Path(term): Path<String>,
    Query(q): Query<FiltroQuery>,
) -> Result<Json<Vec<producto::Model>>, ApiError> {
    let modo = match q.modo.as_deref() {
        None | Some("") => FiltroProducto::default(),
        Some(m) => m.parse::<FiltroProducto>().map_err(|e| ApiError::from_service(e, MSG_CONSULTA))?,
    };
    let productos = factura_service::filtrar_productos(&state.db, &term, modo)
        .await
        .map_err(|e| ApiError::from_service(e, MSG_CONSULTA))?;
    Ok(Json(productos))
}
