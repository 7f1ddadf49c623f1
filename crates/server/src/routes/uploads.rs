use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{header, HeaderValue},
    response::Response,
};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::debug;

use crate::errors::ApiError;
use crate::state::ServerState;

/// `attachment` with an ASCII `filename` fallback plus the RFC 5987 `filename*` form.
fn attachment(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .filter(|c| (c.is_ascii_graphic() || *c == ' ') && *c != '"' && *c != '\\')
        .collect();
    if ascii == filename {
        return format!("attachment; filename=\"{}\"", ascii);
    }
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii,
        urlencoding::encode(filename)
    )
}

#[utoipa::path(
    get, path = "/uploads/img/{nombre_foto}", tag = "uploads",
    params(("nombre_foto" = String, Path, description = "Logical photo name")),
    responses(
        (status = 200, description = "Photo bytes, or the placeholder when the photo is missing"),
        (status = 500, description = "Placeholder unavailable", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn ver_foto(
    State(state): State<ServerState>,
    Path(nombre_foto): Path<String>,
    req: Request,
) -> Result<Response, ApiError> {
    let mensaje = format!("Error, no se pudo cargar la imagen: {}", nombre_foto);
    let loaded = state
        .clientes
        .load_photo(&nombre_foto)
        .await
        .map_err(|e| ApiError::from_service(e, &mensaje))?;
    let recurso = loaded.into_resource();
    debug!(path = %recurso.path.display(), "serving photo");

    // ServeFile 负责 Content-Type、Content-Length 以及 Range/条件请求
    let mut res = match ServeFile::new(&recurso.path).oneshot(req).await {
        Ok(res) => res.map(Body::new),
        Err(never) => match never {},
    };
    if res.status().is_success() {
        let disposition = HeaderValue::from_str(&attachment(&recurso.filename))
            .map_err(|e| ApiError::Internal { mensaje: mensaje.clone(), error: e.to_string() })?;
        res.headers_mut().insert(header::CONTENT_DISPOSITION, disposition);
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_quotes_plain_names() {
        assert_eq!(attachment("abc_MyPic.png"), "attachment; filename=\"abc_MyPic.png\"");
    }

    #[test]
    fn attachment_drops_quotes_from_fallback() {
        assert_eq!(
            attachment("a\"b.png"),
            "attachment; filename=\"ab.png\"; filename*=UTF-8''a%22b.png"
        );
    }

    #[test]
    fn attachment_keeps_unicode_in_extended_parameter() {
        assert_eq!(
            attachment("x_fotó perfil.png"),
            "attachment; filename=\"x_fot perfil.png\"; filename*=UTF-8''x_fot%C3%B3%20perfil.png"
        );
        assert!(HeaderValue::from_str(&attachment("日本.jpg")).is_ok());
    }
}
