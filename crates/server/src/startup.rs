use std::net::SocketAddr;

use axum::http::{HeaderValue, Method};
use axum::Router;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use configs::{AppConfig, ServerConfig};
use service::runtime;

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

/// CORS for the configured origins; an empty list falls back to a permissive policy
pub fn build_cors(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o.trim()) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(origin = %o, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if allowed.is_empty() {
        return CorsLayer::very_permissive();
    }
    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

fn bind_addr(server: &ServerConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", server.host, server.port).parse()?)
}

/// Public entry: load config, prepare storage and database, then serve HTTP
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();

    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(format!("{:#}", e)))?;

    // 上传目录与占位图检查
    runtime::ensure_env(&cfg.storage).await?;

    // DB connection + migrations
    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await?;
    info!("migrations applied");

    let state = ServerState::new(db, &cfg.storage);
    let cors = build_cors(&cfg.server.cors_origins);
    let app: Router = routes::build_router(state, cors, cfg.server.body_limit_bytes);

    let addr = bind_addr(&cfg.server)?;
    info!(%addr, upload_dir = %cfg.storage.upload_dir, "starting clientes server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_from_config() {
        let s = ServerConfig { host: "0.0.0.0".into(), port: 8080, ..ServerConfig::default() };
        assert_eq!(bind_addr(&s).unwrap().port(), 8080);
        let bad = ServerConfig { host: "not a host".into(), ..ServerConfig::default() };
        assert!(bind_addr(&bad).is_err());
    }
}
