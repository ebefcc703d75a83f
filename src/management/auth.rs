use std::path::{Path, PathBuf};

use crate::{Res, TempoError, config, config::Config, debug, spotify, types::Token, utils};

/// Seconds before the real expiry at which a token is treated as expired.
const EXPIRY_BUFFER_SECS: u64 = 240;

/// Holds the OAuth token of the current user and its cache file.
///
/// The token is stored as pretty-printed JSON, by default in
/// `<data dir>/tempo-organizer/cache/token.json`. Expired tokens are
/// refreshed on demand by [`TokenManager::get_valid_token`].
pub struct TokenManager {
    token: Token,
    path: PathBuf,
}

impl TokenManager {
    /// Wraps a token that will be cached at the default location.
    pub fn new(token: Token) -> Self {
        Self::with_path(token, Self::token_path())
    }

    /// Uses a cache file other than the default one.
    pub fn with_path(token: Token, path: PathBuf) -> Self {
        TokenManager { token, path }
    }

    /// Loads the token from the default cache file.
    ///
    /// # Errors
    ///
    /// Returns [`TempoError::NoToken`] if nothing is cached yet, and an IO or
    /// parse error if the file cannot be read or is not a token.
    pub async fn load() -> Res<Self> {
        Self::load_from(&Self::token_path()).await
    }

    /// Loads the token from `path`, which also becomes the cache location.
    ///
    /// # Errors
    ///
    /// Same as [`TokenManager::load`].
    pub async fn load_from(path: &Path) -> Res<Self> {
        let content = match async_fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(TempoError::NoToken),
            Err(e) => return Err(e.into()),
        };
        let token: Token = serde_json::from_str(&content)?;
        Ok(Self {
            token,
            path: path.to_path_buf(),
        })
    }

    /// Writes the token to the cache file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Fails if the directory or the file cannot be written.
    pub async fn persist(&self) -> Res<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.token)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Returns an access token, refreshing and persisting it first if it is
    /// about to expire.
    ///
    /// # Arguments
    ///
    /// * `config` - Provides the token endpoint and client credentials
    ///
    /// # Errors
    ///
    /// Fails if the refresh request is rejected or the refreshed token cannot
    /// be persisted.
    pub async fn get_valid_token(&mut self, config: &Config) -> Res<String> {
        if self.is_expired() {
            debug!("Access token expired, refreshing");
            self.token = spotify::auth::refresh_token(config, &self.token.refresh_token).await?;
            self.persist().await?;
        }

        Ok(self.token.access_token.clone())
    }

    /// Whether the token expires within the next four minutes.
    pub fn is_expired(&self) -> bool {
        let expires_at = self.token.obtained_at + self.token.expires_in;
        utils::now_secs() >= expires_at.saturating_sub(EXPIRY_BUFFER_SECS)
    }

    fn token_path() -> PathBuf {
        config::data_dir().join("cache/token.json")
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}
