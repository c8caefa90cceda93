use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, Json, Path};
use crate::server::AppState;

/// Query parameters forwarded to TMDB. Anything absent or empty is
/// dropped before the upstream call.
#[derive(Debug, Deserialize)]
pub struct MovieQuery {
    pub language: Option<String>,
    pub region: Option<String>,
    pub page: Option<String>,
}

pub async fn discover(
    State(state): State<AppState>,
    Query(q): Query<MovieQuery>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .tmdb
        .discover_movies(q.language.as_deref(), q.region.as_deref(), q.page.as_deref())
        .await?;
    Ok(Json(body))
}

pub async fn popular(
    State(state): State<AppState>,
    Query(q): Query<MovieQuery>,
) -> Result<Json<Value>, ApiError> {
    movie_list(&state, "popular", &q).await
}

pub async fn now_playing(
    State(state): State<AppState>,
    Query(q): Query<MovieQuery>,
) -> Result<Json<Value>, ApiError> {
    movie_list(&state, "now_playing", &q).await
}

pub async fn upcoming(
    State(state): State<AppState>,
    Query(q): Query<MovieQuery>,
) -> Result<Json<Value>, ApiError> {
    movie_list(&state, "upcoming", &q).await
}

pub async fn top_rated(
    State(state): State<AppState>,
    Query(q): Query<MovieQuery>,
) -> Result<Json<Value>, ApiError> {
    movie_list(&state, "top_rated", &q).await
}

async fn movie_list(state: &AppState, list: &str, q: &MovieQuery) -> Result<Json<Value>, ApiError> {
    let body = state
        .tmdb
        .movie_list(list, q.language.as_deref(), q.region.as_deref(), q.page.as_deref())
        .await?;
    Ok(Json(body))
}

pub async fn genres(
    State(state): State<AppState>,
    Query(q): Query<MovieQuery>,
) -> Result<Json<Value>, ApiError> {
    let body = state.tmdb.genres(q.language.as_deref()).await?;
    Ok(Json(body))
}

pub async fn movie_details(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(q): Query<MovieQuery>,
) -> Result<Json<Value>, ApiError> {
    let body = state.tmdb.movie(id, q.language.as_deref()).await?;
    Ok(Json(body))
}

pub async fn movie_images(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(q): Query<MovieQuery>,
) -> Result<Json<Value>, ApiError> {
    let body = state.tmdb.movie_images(id, q.language.as_deref()).await?;
    Ok(Json(body))
}

pub async fn movie_reviews(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(q): Query<MovieQuery>,
) -> Result<Json<Value>, ApiError> {
    let body = state.tmdb.movie_reviews(id, q.language.as_deref()).await?;
    Ok(Json(body))
}

pub async fn movie_recommendations(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(q): Query<MovieQuery>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .tmdb
        .movie_recommendations(id, q.language.as_deref(), q.page.as_deref())
        .await?;
    Ok(Json(body))
}

pub async fn movie_credits(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(q): Query<MovieQuery>,
) -> Result<Json<Value>, ApiError> {
    let body = state.tmdb.movie_credits(id, q.language.as_deref()).await?;
    Ok(Json(body))
}

pub async fn person_details(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(q): Query<MovieQuery>,
) -> Result<Json<Value>, ApiError> {
    let body = state.tmdb.person(id, q.language.as_deref()).await?;
    Ok(Json(body))
}

pub async fn person_movie_credits(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(q): Query<MovieQuery>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .tmdb
        .person_movie_credits(id, q.language.as_deref())
        .await?;
    Ok(Json(body))
}
