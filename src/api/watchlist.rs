use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;

use crate::db::{DbError, WatchlistItem, WatchlistRepo};
use crate::error::{ApiError, Json, Path};
use crate::server::AppState;

use super::auth::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct CreateWatchlistRequest {
    #[serde(rename = "movieId")]
    pub movie_id: Option<i64>,
    pub title: Option<String>,
    pub poster_path: Option<String>,
}

pub async fn list_watchlist(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<CurrentUser>,
) -> Result<Json<Vec<WatchlistItem>>, ApiError> {
    let items = state.db.list_watchlist(&user.id).await?;
    Ok(Json(items))
}

pub async fn create_watchlist_item(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<CurrentUser>,
    Json(req): Json<CreateWatchlistRequest>,
) -> Result<Response, ApiError> {
    let movie_id = req
        .movie_id
        .ok_or_else(|| ApiError::BadRequest("movieId is required".to_string()))?;

    let now = Utc::now();
    let item = WatchlistItem {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        movie_id,
        title: req.title,
        poster_path: req.poster_path,
        created_at: Some(now),
        updated_at: Some(now),
    };

    match state.db.create_watchlist_item(&item).await {
        Ok(()) => Ok((StatusCode::CREATED, Json(item)).into_response()),
        Err(DbError::AlreadyExists(_)) => {
            Err(ApiError::Conflict("Movie already in watchlist".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_watchlist_item(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.db.delete_watchlist_item(&id, &user.id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Watchlist item not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
