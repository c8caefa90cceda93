use std::time::Duration;

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    /// Non-success answer from TMDB; carries TMDB's own status_message
    /// when one could be parsed out of the body.
    #[error("{0}")]
    Upstream(String),
    #[error("TMDB request failed")]
    Http(#[source] reqwest::Error),
}

pub type TmdbResult = Result<Value, TmdbError>;

/// Server-side TMDB gateway. Signs every request with the configured
/// API key so the key never reaches a client.
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, TmdbError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(TmdbError::Http)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// GET a TMDB path. The api_key is always appended; parameters
    /// that are absent or empty are dropped from the query. On success
    /// the parsed body is returned verbatim; anything else becomes an
    /// upstream error carrying TMDB's status_message when present.
    pub async fn get(&self, path: &str, params: &[(&str, Option<&str>)]) -> TmdbResult {
        let url = format!("{}/{}", self.base_url, path);

        let mut query: Vec<(&str, &str)> = vec![("api_key", self.api_key.as_str())];
        for (name, value) in params {
            if let Some(v) = value {
                if !v.is_empty() {
                    query.push((name, v));
                }
            }
        }

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(TmdbError::Http)?;

        if !response.status().is_success() {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| {
                    body.get("status_message")
                        .and_then(|m| m.as_str())
                        .map(|m| m.to_string())
                })
                .unwrap_or_else(|| "TMDB request failed".to_string());
            return Err(TmdbError::Upstream(message));
        }

        response.json::<Value>().await.map_err(TmdbError::Http)
    }

    pub async fn discover_movies(
        &self,
        language: Option<&str>,
        region: Option<&str>,
        page: Option<&str>,
    ) -> TmdbResult {
        self.get(
            "discover/movie",
            &[
                ("language", language),
                ("region", region),
                ("page", page.or(Some("1"))),
                ("include_adult", Some("false")),
                ("include_video", Some("false")),
                ("sort_by", Some("popularity.desc")),
            ],
        )
        .await
    }

    pub async fn movie_list(
        &self,
        list: &str,
        language: Option<&str>,
        region: Option<&str>,
        page: Option<&str>,
    ) -> TmdbResult {
        self.get(
            &format!("movie/{}", list),
            &[
                ("language", language),
                ("region", region),
                ("page", page.or(Some("1"))),
            ],
        )
        .await
    }

    pub async fn movie(&self, id: i64, language: Option<&str>) -> TmdbResult {
        self.get(&format!("movie/{}", id), &[("language", language)])
            .await
    }

    pub async fn movie_images(&self, id: i64, language: Option<&str>) -> TmdbResult {
        self.get(&format!("movie/{}/images", id), &[("language", language)])
            .await
    }

    pub async fn movie_reviews(&self, id: i64, language: Option<&str>) -> TmdbResult {
        self.get(&format!("movie/{}/reviews", id), &[("language", language)])
            .await
    }

    pub async fn movie_recommendations(
        &self,
        id: i64,
        language: Option<&str>,
        page: Option<&str>,
    ) -> TmdbResult {
        self.get(
            &format!("movie/{}/recommendations", id),
            &[("language", language), ("page", page.or(Some("1")))],
        )
        .await
    }

    pub async fn movie_credits(&self, id: i64, language: Option<&str>) -> TmdbResult {
        self.get(&format!("movie/{}/credits", id), &[("language", language)])
            .await
    }

    pub async fn genres(&self, language: Option<&str>) -> TmdbResult {
        self.get("genre/movie/list", &[("language", language)]).await
    }

    pub async fn person(&self, id: i64, language: Option<&str>) -> TmdbResult {
        self.get(&format!("person/{}", id), &[("language", language)])
            .await
    }

    pub async fn person_movie_credits(&self, id: i64, language: Option<&str>) -> TmdbResult {
        self.get(
            &format!("person/{}/movie_credits", id),
            &[("language", language)],
        )
        .await
    }
}
