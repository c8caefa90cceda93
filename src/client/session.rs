use std::fs;
use std::path::PathBuf;

use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::api::auth::Claims;

use super::api::ClientError;

const TOKEN_FILE: &str = "token";

/// Client-side auth state. The raw bearer token is persisted under the
/// config directory; identity comes from decoding the token's claims
/// locally, since the signing secret never leaves the server.
pub struct Session {
    dir: PathBuf,
    token: Option<String>,
    username: Option<String>,
}

impl Session {
    /// Loads the persisted session, if any. An expired or undecodable
    /// token is discarded and the session starts logged out.
    pub fn load(dir: PathBuf) -> Self {
        let mut session = Self {
            dir,
            token: None,
            username: None,
        };
        let path = session.token_path();
        if let Ok(token) = fs::read_to_string(&path) {
            let token = token.trim().to_string();
            match decode_claims(&token) {
                Some(claims) => {
                    session.username = Some(claims.username);
                    session.token = Some(token);
                }
                None => {
                    let _ = fs::remove_file(&path);
                }
            }
        }
        session
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Persists the token from a successful login.
    pub fn store_token(&mut self, token: &str) -> Result<(), ClientError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.token_path(), token)?;
        self.username = decode_claims(token).map(|c| c.username);
        self.token = Some(token.to_string());
        Ok(())
    }

    /// Logout. Synchronous, no backend call.
    pub fn clear(&mut self) {
        let _ = fs::remove_file(self.token_path());
        self.token = None;
        self.username = None;
    }
}

/// Reads the claims without checking the signature; expiry is still
/// validated.
fn decode_claims(token: &str) -> Option<Claims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims)
}
