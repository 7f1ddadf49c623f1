use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;

use common::{metrics::encode_metrics, types::Health};

use crate::openapi::ApiDoc;
use crate::state::ServerState;

pub mod clientes;
pub mod facturas;
pub mod uploads;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (axum::http::StatusCode, String) {
    encode_metrics()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: cliente and factura API, photo serving and ops endpoints
pub fn build_router(state: ServerState, cors: CorsLayer, body_limit: usize) -> Router {
    // 静态段优先于 :id，regiones/uploads 不会被当作 id 解析
    let api = Router::new()
        .route("/api/clientes", get(clientes::index).post(clientes::create))
        .route("/api/clientes/page/:page", get(clientes::page))
        .route("/api/clientes/regiones", get(clientes::regiones))
        .route("/api/clientes/uploads", axum::routing::post(clientes::upload))
        .route(
            "/api/clientes/:id",
            get(clientes::show).put(clientes::update).delete(clientes::delete),
        )
        .route("/api/clientes/:id/facturas", get(facturas::de_cliente))
        .route("/api/facturas", axum::routing::post(facturas::create))
        .route("/api/facturas/filtrar-productos/:term", get(facturas::filtrar_productos))
        .route("/api/facturas/:id", get(facturas::show).delete(facturas::delete));

    let photos = Router::new()
        .route("/uploads/img/:nombre_foto", get(uploads::ver_foto))
        .route("/api/uploads/img/:nombre_foto", get(uploads::ver_foto));

    let ops = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api-docs/openapi.json", get(openapi_json));

    api.merge(photos)
        .with_state(state)
        .merge(ops)
        // 上传大小由 RequestBodyLimitLayer 统一限制
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
