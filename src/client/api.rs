use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::db::{Favorite, Review, ReviewWithAuthor, WatchlistItem};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The backend answered with an error status; `message` is the
    /// message field from its JSON body.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Config(String),
    #[error("not logged in")]
    NotAuthenticated,
}

/// The movie fields a save-to-list call sends to the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieRef {
    pub id: i64,
    pub title: String,
    pub poster_path: Option<String>,
}

/// Thin wrapper over the backend's HTTP surface. Bearer-token routes
/// need a token set first; the movie browse routes are public.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        let token = self.token.as_ref().ok_or(ClientError::NotAuthenticated)?;
        Ok(req.bearer_auth(token))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("message")
                    .and_then(|m| m.as_str())
                    .map(|m| m.to_string())
            })
            .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Exchanges credentials for a bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(self.url("/api/users"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        let body = Self::check(response).await?.json::<Value>().await?;
        body.get("token")
            .and_then(|t| t.as_str())
            .map(|t| t.to_string())
            .ok_or_else(|| ClientError::Api {
                status: 200,
                message: "no token in login response".to_string(),
            })
    }

    /// Creates an account. Does not authenticate; returns the server's
    /// success message.
    pub async fn signup(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(self.url("/api/users?action=register"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        let body = Self::check(response).await?.json::<Value>().await?;
        Ok(body
            .get("msg")
            .and_then(|m| m.as_str())
            .unwrap_or("ok")
            .to_string())
    }

    pub async fn get_favorites(&self) -> Result<Vec<Favorite>, ClientError> {
        let req = self.authed(self.http.get(self.url("/api/favorites")))?;
        let response = req.send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn add_favorite(&self, movie: &MovieRef) -> Result<Favorite, ClientError> {
        let req = self.authed(self.http.post(self.url("/api/favorites")))?;
        let response = req
            .json(&json!({
                "movieId": movie.id,
                "title": movie.title,
                "poster_path": movie.poster_path,
            }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn remove_favorite(&self, id: &str) -> Result<(), ClientError> {
        let req = self.authed(
            self.http
                .delete(self.url(&format!("/api/favorites/{}", id))),
        )?;
        let response = req.send().await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn get_watchlist(&self) -> Result<Vec<WatchlistItem>, ClientError> {
        let req = self.authed(self.http.get(self.url("/api/watchlist")))?;
        let response = req.send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn add_watchlist_item(&self, movie: &MovieRef) -> Result<WatchlistItem, ClientError> {
        let req = self.authed(self.http.post(self.url("/api/watchlist")))?;
        let response = req
            .json(&json!({
                "movieId": movie.id,
                "title": movie.title,
                "poster_path": movie.poster_path,
            }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn remove_watchlist_item(&self, id: &str) -> Result<(), ClientError> {
        let req = self.authed(
            self.http
                .delete(self.url(&format!("/api/watchlist/{}", id))),
        )?;
        let response = req.send().await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn get_my_reviews(&self) -> Result<Vec<Review>, ClientError> {
        let req = self.authed(self.http.get(self.url("/api/reviews")))?;
        let response = req.send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn add_review(
        &self,
        movie_id: i64,
        content: &str,
        rating: i32,
    ) -> Result<Review, ClientError> {
        let req = self.authed(self.http.post(self.url("/api/reviews")))?;
        let response = req
            .json(&json!({
                "movieId": movie_id,
                "content": content,
                "rating": rating,
            }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn delete_review(&self, id: &str) -> Result<(), ClientError> {
        let req = self.authed(self.http.delete(self.url(&format!("/api/reviews/{}", id))))?;
        let response = req.send().await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn get_movie_reviews(
        &self,
        movie_id: i64,
    ) -> Result<Vec<ReviewWithAuthor>, ClientError> {
        let req = self.authed(
            self.http
                .get(self.url(&format!("/api/reviews/movie/{}", movie_id))),
        )?;
        let response = req.send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Raw passthrough to a public movie browse route, for callers that
    /// render the TMDB payload directly.
    pub async fn movies(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/api/movies/{}", path)))
            .query(query)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}
