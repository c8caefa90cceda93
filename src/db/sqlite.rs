use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use super::model::*;
use super::repo::*;

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(db_path: &str) -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str(db_path)?.create_if_missing(true);

        // An in-memory database exists per connection, so the pool must
        // stay at one connection for every query to see the same schema.
        let max_connections = if db_path.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let repo = Self { pool };

        repo.init_schema().await?;

        info!("Database initialized at {}", db_path);

        Ok(repo)
    }

    async fn init_schema(&self) -> DbResult<()> {
        let schema = include_str!("schema.sql");
        sqlx::query(schema).execute(&self.pool).await?;
        Ok(())
    }
}

fn unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation),
        _ => false,
    }
}

fn parse_ts(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

#[async_trait]
impl UserRepo for SqliteRepository {
    async fn get_user(&self, username: &str) -> DbResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => DbError::NotFound(format!("User not found: {}", username)),
            _ => DbError::Sqlx(e),
        })
    }

    async fn get_user_by_id(&self, id: &str) -> DbResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => DbError::NotFound(format!("User not found: {}", id)),
            _ => DbError::Sqlx(e),
        })
    }

    async fn create_user(&self, user: &User) -> DbResult<()> {
        sqlx::query("INSERT INTO users (id, username, password, created_at) VALUES (?, ?, ?, ?)")
            .bind(&user.id)
            .bind(&user.username)
            .bind(&user.password)
            .bind(&user.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if unique_violation(&e) {
                    DbError::AlreadyExists(format!("user {}", user.username))
                } else {
                    DbError::Sqlx(e)
                }
            })?;
        Ok(())
    }
}

#[async_trait]
impl FavoriteRepo for SqliteRepository {
    async fn list_favorites(&self, user_id: &str) -> DbResult<Vec<Favorite>> {
        let results = sqlx::query_as::<
            _,
            (
                String,
                String,
                i64,
                Option<String>,
                Option<String>,
                Option<String>,
                Option<String>,
            ),
        >(
            "SELECT id, user_id, movie_id, title, poster_path, created_at, updated_at
             FROM favorites WHERE user_id = ? ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let favorites = results
            .into_iter()
            .map(|r| Favorite {
                id: r.0,
                user_id: r.1,
                movie_id: r.2,
                title: r.3,
                poster_path: r.4,
                created_at: parse_ts(r.5),
                updated_at: parse_ts(r.6),
            })
            .collect();

        Ok(favorites)
    }

    async fn create_favorite(&self, favorite: &Favorite) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO favorites (id, user_id, movie_id, title, poster_path, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&favorite.id)
        .bind(&favorite.user_id)
        .bind(favorite.movie_id)
        .bind(&favorite.title)
        .bind(&favorite.poster_path)
        .bind(favorite.created_at.as_ref().map(|dt| dt.to_rfc3339()))
        .bind(favorite.updated_at.as_ref().map(|dt| dt.to_rfc3339()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if unique_violation(&e) {
                DbError::AlreadyExists(format!("favorite for movie {}", favorite.movie_id))
            } else {
                DbError::Sqlx(e)
            }
        })?;
        Ok(())
    }

    async fn delete_favorite(&self, id: &str, user_id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl WatchlistRepo for SqliteRepository {
    async fn list_watchlist(&self, user_id: &str) -> DbResult<Vec<WatchlistItem>> {
        let results = sqlx::query_as::<
            _,
            (
                String,
                String,
                i64,
                Option<String>,
                Option<String>,
                Option<String>,
                Option<String>,
            ),
        >(
            "SELECT id, user_id, movie_id, title, poster_path, created_at, updated_at
             FROM watchlist WHERE user_id = ? ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let items = results
            .into_iter()
            .map(|r| WatchlistItem {
                id: r.0,
                user_id: r.1,
                movie_id: r.2,
                title: r.3,
                poster_path: r.4,
                created_at: parse_ts(r.5),
                updated_at: parse_ts(r.6),
            })
            .collect();

        Ok(items)
    }

    async fn create_watchlist_item(&self, item: &WatchlistItem) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO watchlist (id, user_id, movie_id, title, poster_path, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&item.id)
        .bind(&item.user_id)
        .bind(item.movie_id)
        .bind(&item.title)
        .bind(&item.poster_path)
        .bind(item.created_at.as_ref().map(|dt| dt.to_rfc3339()))
        .bind(item.updated_at.as_ref().map(|dt| dt.to_rfc3339()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if unique_violation(&e) {
                DbError::AlreadyExists(format!("watchlist entry for movie {}", item.movie_id))
            } else {
                DbError::Sqlx(e)
            }
        })?;
        Ok(())
    }

    async fn delete_watchlist_item(&self, id: &str, user_id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM watchlist WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ReviewRepo for SqliteRepository {
    async fn list_reviews_by_user(&self, user_id: &str) -> DbResult<Vec<Review>> {
        let results = sqlx::query_as::<
            _,
            (
                String,
                String,
                i64,
                String,
                i32,
                Option<String>,
                Option<String>,
            ),
        >(
            "SELECT id, user_id, movie_id, content, rating, created_at, updated_at
             FROM reviews WHERE user_id = ? ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let reviews = results
            .into_iter()
            .map(|r| Review {
                id: r.0,
                user_id: r.1,
                movie_id: r.2,
                content: r.3,
                rating: r.4,
                created_at: parse_ts(r.5),
                updated_at: parse_ts(r.6),
            })
            .collect();

        Ok(reviews)
    }

    async fn list_reviews_for_movie(&self, movie_id: i64) -> DbResult<Vec<ReviewWithAuthor>> {
        let results = sqlx::query_as::<
            _,
            (
                String,
                String,
                String,
                i64,
                String,
                i32,
                Option<String>,
                Option<String>,
            ),
        >(
            "SELECT r.id, r.user_id, u.username, r.movie_id, r.content, r.rating, r.created_at, r.updated_at
             FROM reviews r JOIN users u ON u.id = r.user_id
             WHERE r.movie_id = ? ORDER BY r.created_at",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        let reviews = results
            .into_iter()
            .map(|r| ReviewWithAuthor {
                id: r.0,
                user_id: r.1,
                username: r.2,
                movie_id: r.3,
                content: r.4,
                rating: r.5,
                created_at: parse_ts(r.6),
                updated_at: parse_ts(r.7),
            })
            .collect();

        Ok(reviews)
    }

    async fn create_review(&self, review: &Review) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO reviews (id, user_id, movie_id, content, rating, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&review.id)
        .bind(&review.user_id)
        .bind(review.movie_id)
        .bind(&review.content)
        .bind(review.rating)
        .bind(review.created_at.as_ref().map(|dt| dt.to_rfc3339()))
        .bind(review.updated_at.as_ref().map(|dt| dt.to_rfc3339()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if unique_violation(&e) {
                DbError::AlreadyExists(format!("review for movie {}", review.movie_id))
            } else {
                DbError::Sqlx(e)
            }
        })?;
        Ok(())
    }

    async fn delete_review(&self, id: &str, user_id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
