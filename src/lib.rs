pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod server;
pub mod tmdb;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] db::DbError),
    #[error("Server error: {0}")]
    Server(String),
}

pub async fn run(config_path: &str) -> Result<(), ServerError> {
    let config = config::Config::from_file(config_path)?;

    info!("Using config file: {}", config_path);

    if config.auth.secret.is_empty() {
        return Err(ServerError::Server(
            "No auth secret configured (auth.secret or $FILMSHELF_SECRET)".to_string(),
        ));
    }
    if config.tmdb.api_key.is_empty() {
        warn!("No TMDB api key configured; /api/movies routes will fail upstream");
    }

    error::set_production(config.production);

    let db_path = config
        .get_database_path()
        .ok_or_else(|| ServerError::Server("No database path configured".to_string()))?;

    info!("Opening database at {}", db_path);
    let db = Arc::new(db::SqliteRepository::new(&db_path).await?);

    let tmdb = Arc::new(
        tmdb::TmdbClient::new(&config.tmdb.base_url, &config.tmdb.api_key)
            .map_err(|e| ServerError::Server(format!("Failed to create TMDB client: {}", e)))?,
    );

    let address = config.listen.address.as_deref().unwrap_or("[::]");
    let port = &config.listen.port;
    let addr: SocketAddr = format!("{}:{}", address, port)
        .parse()
        .map_err(|e| ServerError::Server(format!("Invalid address: {}", e)))?;

    let state = server::AppState::new(config.clone(), db, tmdb);
    let app = server::build_router(state);

    if let (Some(cert_path), Some(key_path)) =
        (config.listen.tlscert.as_ref(), config.listen.tlskey.as_ref())
    {
        info!("Loading TLS certificate from {}", cert_path);
        info!("Loading TLS key from {}", key_path);

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert_path, key_path)
            .await
            .map_err(|e| ServerError::Server(format!("Failed to load TLS config: {}", e)))?;

        info!("Serving HTTPS on {}", addr);

        axum_server::bind_rustls(addr, tls_config)
            .http1_only()
            .serve(app.into_make_service())
            .await
            .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;
    } else {
        info!("Serving HTTP on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Server(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;
    }

    Ok(())
}
