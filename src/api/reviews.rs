use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;

use crate::db::{DbError, Review, ReviewRepo, ReviewWithAuthor};
use crate::error::{ApiError, Json, Path};
use crate::server::AppState;

use super::auth::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    #[serde(rename = "movieId")]
    pub movie_id: Option<i64>,
    pub content: Option<String>,
    pub rating: Option<i32>,
}

/// The caller's own reviews.
pub async fn list_my_reviews(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<CurrentUser>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews = state.db.list_reviews_by_user(&user.id).await?;
    Ok(Json(reviews))
}

/// All reviews for one movie, across users, with each reviewer's
/// username attached.
pub async fn list_movie_reviews(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
) -> Result<Json<Vec<ReviewWithAuthor>>, ApiError> {
    let reviews = state.db.list_reviews_for_movie(movie_id).await?;
    Ok(Json(reviews))
}

pub async fn create_review(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<CurrentUser>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<Response, ApiError> {
    let movie_id = req
        .movie_id
        .ok_or_else(|| ApiError::BadRequest("movieId is required".to_string()))?;

    let content = req.content.as_deref().unwrap_or("").trim().to_string();
    if content.is_empty() {
        return Err(ApiError::BadRequest("content is required".to_string()));
    }

    let rating = req
        .rating
        .ok_or_else(|| ApiError::BadRequest("rating is required".to_string()))?;
    if !(0..=5).contains(&rating) {
        return Err(ApiError::BadRequest(
            "rating must be between 0 and 5".to_string(),
        ));
    }

    let now = Utc::now();
    let review = Review {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        movie_id,
        content,
        rating,
        created_at: Some(now),
        updated_at: Some(now),
    };

    match state.db.create_review(&review).await {
        Ok(()) => Ok((StatusCode::CREATED, Json(review)).into_response()),
        Err(DbError::AlreadyExists(_)) => Err(ApiError::Conflict(
            "You have already reviewed this movie".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_review(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.db.delete_review(&id, &user.id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Review not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
