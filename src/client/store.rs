use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::db::{Favorite, Review, WatchlistItem};

use super::api::{ApiClient, ClientError, MovieRef};

const PREFS_FILE: &str = "prefs.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Prefs {
    tmdb_region: String,
    tmdb_language: String,
}

/// In-memory mirror of the caller's favorites, watchlist and reviews.
/// Rows only ever come from confirmed backend responses; a reload
/// replaces everything wholesale.
pub struct UserDataStore {
    dir: PathBuf,
    pub favorites: Vec<Favorite>,
    pub watchlist: Vec<WatchlistItem>,
    pub my_reviews: Vec<Review>,
    region: String,
    language: String,
}

impl UserDataStore {
    pub fn load(dir: PathBuf) -> Self {
        let (region, language) = load_prefs(&dir);
        Self {
            dir,
            favorites: Vec::new(),
            watchlist: Vec::new(),
            my_reviews: Vec::new(),
            region,
            language,
        }
    }

    /// Fetches all three collections concurrently. A failed fetch
    /// leaves that collection empty instead of failing the reload.
    pub async fn reload(&mut self, api: &ApiClient) {
        let (favorites, watchlist, reviews) = tokio::join!(
            api.get_favorites(),
            api.get_watchlist(),
            api.get_my_reviews(),
        );
        self.favorites = favorites.unwrap_or_default();
        self.watchlist = watchlist.unwrap_or_default();
        self.my_reviews = reviews.unwrap_or_default();
    }

    /// Logout path. Drops all rows without touching the backend.
    pub fn clear(&mut self) {
        self.favorites.clear();
        self.watchlist.clear();
        self.my_reviews.clear();
    }

    pub fn is_favorite(&self, movie_id: i64) -> bool {
        self.favorites.iter().any(|f| f.movie_id == movie_id)
    }

    pub fn is_in_watchlist(&self, movie_id: i64) -> bool {
        self.watchlist.iter().any(|w| w.movie_id == movie_id)
    }

    pub async fn add_to_favorites(
        &mut self,
        api: &ApiClient,
        movie: &MovieRef,
    ) -> Result<(), ClientError> {
        if self.is_favorite(movie.id) {
            return Ok(());
        }
        let row = api.add_favorite(movie).await?;
        self.favorites.push(row);
        Ok(())
    }

    /// Removes by TMDB movie id, resolving the backing row locally.
    /// Returns whether anything was removed.
    pub async fn remove_from_favorites(
        &mut self,
        api: &ApiClient,
        movie_id: i64,
    ) -> Result<bool, ClientError> {
        let Some(row) = self.favorites.iter().find(|f| f.movie_id == movie_id) else {
            return Ok(false);
        };
        let id = row.id.clone();
        api.remove_favorite(&id).await?;
        self.favorites.retain(|f| f.id != id);
        Ok(true)
    }

    /// Membership is decided by TMDB movie id. Returns whether the
    /// movie is on the watchlist after the toggle.
    pub async fn toggle_watchlist(
        &mut self,
        api: &ApiClient,
        movie: &MovieRef,
    ) -> Result<bool, ClientError> {
        if let Some(row) = self.watchlist.iter().find(|w| w.movie_id == movie.id) {
            let id = row.id.clone();
            api.remove_watchlist_item(&id).await?;
            self.watchlist.retain(|w| w.id != id);
            Ok(false)
        } else {
            let row = api.add_watchlist_item(movie).await?;
            self.watchlist.push(row);
            Ok(true)
        }
    }

    pub async fn add_review(
        &mut self,
        api: &ApiClient,
        movie_id: i64,
        content: &str,
        rating: i32,
    ) -> Result<(), ClientError> {
        let row = api.add_review(movie_id, content, rating).await?;
        self.my_reviews.retain(|r| r.movie_id != movie_id);
        self.my_reviews.push(row);
        Ok(())
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn set_region(&mut self, region: &str) -> Result<(), ClientError> {
        self.region = region.to_string();
        self.save_prefs()
    }

    pub fn set_language(&mut self, language: &str) -> Result<(), ClientError> {
        self.language = language.to_string();
        self.save_prefs()
    }

    fn save_prefs(&self) -> Result<(), ClientError> {
        fs::create_dir_all(&self.dir)?;
        let prefs = Prefs {
            tmdb_region: self.region.clone(),
            tmdb_language: self.language.clone(),
        };
        let content =
            serde_json::to_string_pretty(&prefs).map_err(|e| ClientError::Config(e.to_string()))?;
        fs::write(self.dir.join(PREFS_FILE), content)?;
        Ok(())
    }
}

fn load_prefs(dir: &Path) -> (String, String) {
    let fallback_region = std::env::var("FILMSHELF_REGION").unwrap_or_else(|_| "IE".to_string());
    let fallback_language =
        std::env::var("FILMSHELF_LANGUAGE").unwrap_or_else(|_| "en-US".to_string());

    let content = match fs::read_to_string(dir.join(PREFS_FILE)) {
        Ok(content) => content,
        Err(_) => return (fallback_region, fallback_language),
    };
    match serde_json::from_str::<Prefs>(&content) {
        Ok(prefs) => (prefs.tmdb_region, prefs.tmdb_language),
        Err(_) => (fallback_region, fallback_language),
    }
}
