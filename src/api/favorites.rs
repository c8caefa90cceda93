use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;

use crate::db::{DbError, Favorite, FavoriteRepo};
use crate::error::{ApiError, Json, Path};
use crate::server::AppState;

use super::auth::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct CreateFavoriteRequest {
    #[serde(rename = "movieId")]
    pub movie_id: Option<i64>,
    pub title: Option<String>,
    pub poster_path: Option<String>,
}

pub async fn list_favorites(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<CurrentUser>,
) -> Result<Json<Vec<Favorite>>, ApiError> {
    let favorites = state.db.list_favorites(&user.id).await?;
    Ok(Json(favorites))
}

pub async fn create_favorite(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<CurrentUser>,
    Json(req): Json<CreateFavoriteRequest>,
) -> Result<Response, ApiError> {
    let movie_id = req
        .movie_id
        .ok_or_else(|| ApiError::BadRequest("movieId is required".to_string()))?;

    let now = Utc::now();
    let favorite = Favorite {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        movie_id,
        title: req.title,
        poster_path: req.poster_path,
        created_at: Some(now),
        updated_at: Some(now),
    };

    match state.db.create_favorite(&favorite).await {
        Ok(()) => Ok((StatusCode::CREATED, Json(favorite)).into_response()),
        Err(DbError::AlreadyExists(_)) => {
            Err(ApiError::Conflict("Movie already in favorites".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_favorite(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.db.delete_favorite(&id, &user.id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Favorite not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
