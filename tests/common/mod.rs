#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use filmshelf_rs::config::Config;
use filmshelf_rs::db::SqliteRepository;
use filmshelf_rs::server::{build_router, AppState};
use filmshelf_rs::tmdb::TmdbClient;

pub const SECRET: &str = "integration-test-secret";

/// Full router over a fresh in-memory database. TMDB points at a port
/// nothing listens on, so upstream calls fail fast if a test hits them.
pub async fn test_app() -> Result<Router> {
    test_app_with_tmdb("http://127.0.0.1:9").await
}

pub async fn test_app_with_tmdb(tmdb_url: &str) -> Result<Router> {
    let mut config = Config::default();
    config.auth.secret = SECRET.to_string();

    let db = Arc::new(SqliteRepository::new(":memory:").await?);
    let tmdb = Arc::new(TmdbClient::new(tmdb_url, "test-api-key")?);
    let state = AppState::new(config, db, tmdb);
    Ok(build_router(state))
}

/// Serves a router on an ephemeral local port and returns its base URL.
pub async fn serve_app(app: Router) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Ok(format!("http://{}", addr))
}

/// One in-process request. Returns the status and the parsed JSON body
/// (Null for empty bodies such as 204 responses).
pub async fn request(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let auth = token.map(|t| format!("Bearer {}", t));
    raw_request(app, method, path, auth.as_deref(), body).await
}

/// Like `request`, but the Authorization header is sent verbatim.
pub async fn raw_request(
    app: &Router,
    method: &str,
    path: &str,
    auth_header: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(header) = auth_header {
        builder = builder.header("Authorization", header);
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };
    send(app, request).await
}

/// Like `request`, but the body bytes go out exactly as given, with
/// whatever content type the caller picked (or none at all).
pub async fn request_with_body(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    content_type: Option<&str>,
    body: &str,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(t) = token {
        builder = builder.header("Authorization", format!("Bearer {}", t));
    }
    if let Some(ct) = content_type {
        builder = builder.header("Content-Type", ct);
    }
    send(app, builder.body(Body::from(body.to_string()))?).await
}

async fn send(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

pub async fn register(app: &Router, username: &str, password: &str) -> Result<()> {
    let (status, body) = request(
        app,
        "POST",
        "/api/users?action=register",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await?;
    anyhow::ensure!(
        status == StatusCode::CREATED,
        "register failed: {} {}",
        status,
        body
    );
    Ok(())
}

pub async fn login(app: &Router, username: &str, password: &str) -> Result<String> {
    let (status, body) = request(
        app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await?;
    anyhow::ensure!(status == StatusCode::OK, "login failed: {} {}", status, body);
    body.get("token")
        .and_then(|t| t.as_str())
        .map(|t| t.to_string())
        .ok_or_else(|| anyhow::anyhow!("no token in login response"))
}

/// Registers a fresh account and returns its bearer token.
pub async fn signup_and_login(app: &Router, username: &str) -> Result<String> {
    register(app, username, "password1").await?;
    login(app, username, "password1").await
}
