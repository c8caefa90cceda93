use async_trait::async_trait;

use super::model::*;

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get_user(&self, username: &str) -> DbResult<User>;
    async fn get_user_by_id(&self, id: &str) -> DbResult<User>;
    async fn create_user(&self, user: &User) -> DbResult<()>;
}

#[async_trait]
pub trait FavoriteRepo: Send + Sync {
    async fn list_favorites(&self, user_id: &str) -> DbResult<Vec<Favorite>>;
    async fn create_favorite(&self, favorite: &Favorite) -> DbResult<()>;
    /// Deletes the row owned by `user_id`. Returns whether a row matched.
    async fn delete_favorite(&self, id: &str, user_id: &str) -> DbResult<bool>;
}

#[async_trait]
pub trait WatchlistRepo: Send + Sync {
    async fn list_watchlist(&self, user_id: &str) -> DbResult<Vec<WatchlistItem>>;
    async fn create_watchlist_item(&self, item: &WatchlistItem) -> DbResult<()>;
    async fn delete_watchlist_item(&self, id: &str, user_id: &str) -> DbResult<bool>;
}

#[async_trait]
pub trait ReviewRepo: Send + Sync {
    async fn list_reviews_by_user(&self, user_id: &str) -> DbResult<Vec<Review>>;
    async fn list_reviews_for_movie(&self, movie_id: i64) -> DbResult<Vec<ReviewWithAuthor>>;
    async fn create_review(&self, review: &Review) -> DbResult<()>;
    async fn delete_review(&self, id: &str, user_id: &str) -> DbResult<bool>;
}
