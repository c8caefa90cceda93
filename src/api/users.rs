use std::collections::HashMap;
use std::sync::OnceLock;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use crate::db::{DbError, User, UserRepo};
use crate::error::{ApiError, Json};
use crate::server::AppState;

use super::auth;

static USERNAME_PATTERN: OnceLock<Regex> = OnceLock::new();

fn username_pattern() -> &'static Regex {
    USERNAME_PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]{3,30}$").unwrap())
}

fn valid_password(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// POST /api/users is login by default; with ?action=register it
/// creates the account instead.
pub async fn post_users(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Response, ApiError> {
    let username = req.username.as_deref().unwrap_or("").trim().to_string();
    let password = req.password.unwrap_or_default();

    if username.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password are required.".to_string(),
        ));
    }

    if params.get("action").map(String::as_str) == Some("register") {
        register(&state, &username, &password).await
    } else {
        authenticate(&state, &username, &password).await
    }
}

async fn register(state: &AppState, username: &str, password: &str) -> Result<Response, ApiError> {
    if !username_pattern().is_match(username) {
        return Err(ApiError::BadRequest(
            "Username must be 3-30 characters of letters, numbers or underscore.".to_string(),
        ));
    }
    if !valid_password(password) {
        return Err(ApiError::BadRequest(
            "Password must be at least 8 characters long and contain at least one letter and one digit."
                .to_string(),
        ));
    }

    let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("bcrypt: {}", e)))?;

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        username: username.to_string(),
        password: hash,
        created_at: Some(chrono::Utc::now().to_rfc3339()),
    };

    match state.db.create_user(&user).await {
        Ok(()) => {}
        Err(DbError::AlreadyExists(_)) => {
            return Err(ApiError::Conflict("Username already exists.".to_string()))
        }
        Err(e) => return Err(e.into()),
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "msg": "User successfully created." })),
    )
        .into_response())
}

async fn authenticate(
    state: &AppState,
    username: &str,
    password: &str,
) -> Result<Response, ApiError> {
    let user = match state.db.get_user(username).await {
        Ok(user) => user,
        Err(DbError::NotFound(_)) => {
            return Err(ApiError::Unauthorized(
                "Authentication failed. User not found.".to_string(),
            ))
        }
        Err(e) => return Err(e.into()),
    };

    let matches = bcrypt::verify(password, &user.password)
        .map_err(|e| ApiError::Internal(format!("bcrypt: {}", e)))?;
    if !matches {
        return Err(ApiError::Unauthorized(
            "Authentication failed. Wrong password.".to_string(),
        ));
    }

    let token = auth::create_token(
        &user.username,
        &state.config.auth.secret,
        state.config.auth.token_expiry_hours,
    )
    .map_err(|e| ApiError::Internal(format!("token: {}", e)))?;

    Ok(Json(json!({ "success": true, "token": token })).into_response())
}
