pub mod api;
pub mod session;
pub mod store;

pub use api::{ApiClient, ClientError, MovieRef};
pub use session::Session;
pub use store::UserDataStore;

use std::path::PathBuf;

/// Directory holding the persisted token and preferences. Defaults to
/// ~/.config/filmshelf, overridable with FILMSHELF_CONFIG_DIR.
pub fn config_dir() -> Result<PathBuf, ClientError> {
    if let Ok(custom) = std::env::var("FILMSHELF_CONFIG_DIR") {
        return Ok(PathBuf::from(custom));
    }
    let home = std::env::var("HOME")
        .map_err(|_| ClientError::Config("HOME environment variable not set".to_string()))?;
    Ok(PathBuf::from(home).join(".config").join("filmshelf"))
}
