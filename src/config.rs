use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub appdir: Option<String>,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub production: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default)]
    pub tlscert: Option<String>,
    #[serde(default)]
    pub tlskey: Option<String>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_port(),
            tlscert: None,
            tlskey: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub sqlite: Option<SqliteConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SqliteConfig {
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_tmdb_base_url(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_token_expiry_hours")]
    pub token_expiry_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            token_expiry_hours: default_token_expiry_hours(),
        }
    }
}

fn default_port() -> String {
    "8080".to_string()
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_token_expiry_hours() -> i64 {
    168
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_string(), e))?;

        config.apply_env();

        Ok(config)
    }

    /// Secrets left empty in the file fall back to the environment.
    pub fn apply_env(&mut self) {
        if self.tmdb.api_key.is_empty() {
            if let Ok(key) = std::env::var("TMDB_KEY") {
                self.tmdb.api_key = key;
            }
        }
        if self.auth.secret.is_empty() {
            if let Ok(secret) = std::env::var("FILMSHELF_SECRET") {
                self.auth.secret = secret;
            }
        }
    }

    pub fn get_database_path(&self) -> Option<String> {
        self.database.sqlite.as_ref().map(|s| s.filename.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
}
