use axum::{
    extract::Request,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::db::SqliteRepository;
use crate::tmdb::TmdbClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<SqliteRepository>,
    pub tmdb: Arc<TmdbClient>,
}

impl AppState {
    pub fn new(config: Config, db: Arc<SqliteRepository>, tmdb: Arc<TmdbClient>) -> Self {
        Self {
            config: Arc::new(config),
            db,
            tmdb,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let movie_routes = Router::new()
        .route("/api/movies/discover", get(crate::api::movies::discover))
        .route("/api/movies/popular", get(crate::api::movies::popular))
        .route(
            "/api/movies/now-playing",
            get(crate::api::movies::now_playing),
        )
        .route("/api/movies/upcoming", get(crate::api::movies::upcoming))
        .route("/api/movies/top-rated", get(crate::api::movies::top_rated))
        .route("/api/movies/genres", get(crate::api::movies::genres))
        .route("/api/movies/:id", get(crate::api::movies::movie_details))
        .route(
            "/api/movies/:id/images",
            get(crate::api::movies::movie_images),
        )
        .route(
            "/api/movies/:id/reviews",
            get(crate::api::movies::movie_reviews),
        )
        .route(
            "/api/movies/:id/recommendations",
            get(crate::api::movies::movie_recommendations),
        )
        .route(
            "/api/movies/:id/credits",
            get(crate::api::movies::movie_credits),
        )
        .route(
            "/api/movies/person/:id",
            get(crate::api::movies::person_details),
        )
        .route(
            "/api/movies/person/:id/movie_credits",
            get(crate::api::movies::person_movie_credits),
        );

    // Everything touching per-user rows sits behind the bearer-token
    // middleware.
    let user_data_routes = Router::new()
        .route(
            "/api/favorites",
            get(crate::api::favorites::list_favorites).post(crate::api::favorites::create_favorite),
        )
        .route(
            "/api/favorites/:id",
            delete(crate::api::favorites::delete_favorite),
        )
        .route(
            "/api/watchlist",
            get(crate::api::watchlist::list_watchlist)
                .post(crate::api::watchlist::create_watchlist_item),
        )
        .route(
            "/api/watchlist/:id",
            delete(crate::api::watchlist::delete_watchlist_item),
        )
        .route(
            "/api/reviews",
            get(crate::api::reviews::list_my_reviews).post(crate::api::reviews::create_review),
        )
        .route(
            "/api/reviews/movie/:movie_id",
            get(crate::api::reviews::list_movie_reviews),
        )
        .route(
            "/api/reviews/:id",
            delete(crate::api::reviews::delete_review),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::api::auth::auth_middleware,
        ));

    let account_routes = Router::new().route("/api/users", post(crate::api::users::post_users));

    let mut router = Router::new()
        .route("/robots.txt", get(robots_txt_handler))
        .merge(movie_routes)
        .merge(user_data_routes)
        .merge(account_routes)
        .fallback(fallback_handler);

    if let Some(ref appdir) = state.config.appdir {
        // ServeDir replaces the fallback for unmatched paths; CORS
        // preflight is still answered by the CorsLayer before routing.
        router = router.fallback_service(ServeDir::new(appdir));
    }

    router
        .layer(axum::middleware::from_fn(crate::middleware::log_request))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn robots_txt_handler() -> &'static str {
    "User-agent: *\nDisallow: /\n"
}

async fn fallback_handler(req: Request<axum::body::Body>) -> impl IntoResponse {
    // OPTIONS gets 200 so CORS preflight succeeds on unmatched paths
    if req.method() == axum::http::Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    StatusCode::NOT_FOUND.into_response()
}
