use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::UserRepo;
use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated account, attached to request extensions by
/// `auth_middleware` and read back by handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
}

pub fn create_token(
    username: &str,
    secret: &str,
    expiry_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        username: username.to_string(),
        iat: now.timestamp(),
        exp: (now + chrono::Duration::hours(expiry_hours)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Guards the user-data routes. The token is the second segment of the
/// Authorization header; any failure short-circuits with 401 before the
/// handler runs.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("No authorization header".to_string()))?;

    let token = header
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| ApiError::Unauthorized("Bearer token not found".to_string()))?;

    let claims = verify_token(token, &state.config.auth.secret)
        .map_err(|e| ApiError::Unauthorized(format!("Verification Failed: {}", e)))?;

    let user = state
        .db
        .get_user(&claims.username)
        .await
        .map_err(|_| ApiError::Unauthorized("User not found".to_string()))?;

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
    });

    Ok(next.run(req).await)
}
