//! Configuration management for tempo-organizer.
//!
//! Values come from environment variables, which may be seeded from `.env`
//! files. Precedence, highest first:
//! 1. Environment variables
//! 2. `.env` in the current working directory
//! 3. `.env` in the local data directory (`tempo-organizer/.env`)
//! 4. Application defaults (for the optional values)
//!
//! The three credentials keep the `SPOTIPY_` names so an existing setup can be
//! reused as is.

use std::{
    env,
    io::ErrorKind,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};

use reqwest::Url;

use crate::{Res, TempoError};

pub const CLIENT_ID_VAR: &str = "SPOTIPY_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "SPOTIPY_CLIENT_SECRET";
pub const REDIRECT_URI_VAR: &str = "SPOTIPY_REDIRECT_URI";
pub const API_URL_VAR: &str = "SPOTIFY_API_URL";
pub const AUTH_URL_VAR: &str = "SPOTIFY_API_AUTH_URL";
pub const TOKEN_URL_VAR: &str = "SPOTIFY_API_TOKEN_URL";
pub const AUTH_TIMEOUT_VAR: &str = "TEMPO_ORGANIZER_AUTH_TIMEOUT";

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 120;

/// Permissions requested during authorization.
pub const SPOTIFY_SCOPE: &str =
    "user-library-read playlist-read-private playlist-modify-public playlist-modify-private";

/// Name of the application directory below the platform data directory.
pub const APP_DIR: &str = "tempo-organizer";

/// Runtime configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub api_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub auth_timeout: Duration,
    redirect: Url,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`TempoError::MissingConfig`] naming the first required variable
    /// that is absent, or [`TempoError::InvalidConfig`] when a value cannot be
    /// used (for example a redirect URI that does not point at localhost).
    pub fn from_env() -> Res<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    ///
    /// Empty values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Res<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(TempoError::MissingConfig(key));

        let client_id = require(CLIENT_ID_VAR)?;
        let client_secret = require(CLIENT_SECRET_VAR)?;
        let redirect_uri = require(REDIRECT_URI_VAR)?;
        let redirect = parse_redirect_uri(&redirect_uri)?;

        let auth_timeout = match get(AUTH_TIMEOUT_VAR) {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| TempoError::InvalidConfig {
                    name: AUTH_TIMEOUT_VAR,
                    reason: e.to_string(),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_AUTH_TIMEOUT_SECS),
        };

        Ok(Config {
            client_id,
            client_secret,
            redirect_uri,
            api_url: trim_url(get(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string())),
            auth_url: get(AUTH_URL_VAR).unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            token_url: get(TOKEN_URL_VAR).unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            auth_timeout,
            redirect,
        })
    }

    /// IPv4 loopback address of the callback listener.
    pub fn callback_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, self.callback_port()))
    }

    /// Every address the callback listener binds to.
    ///
    /// For `localhost` this is both loopback addresses, since a browser may
    /// resolve it to `::1` first. For `127.0.0.1` only the IPv4 one.
    pub fn callback_addrs(&self) -> Vec<SocketAddr> {
        let mut addrs = vec![self.callback_addr()];
        if self.redirect.host_str() == Some("localhost") {
            addrs.push(SocketAddr::from((Ipv6Addr::LOCALHOST, self.callback_port())));
        }
        addrs
    }

    fn callback_port(&self) -> u16 {
        // a port is required by parse_redirect_uri
        self.redirect.port_or_known_default().unwrap_or(80)
    }

    /// Route path the authorization server redirects to.
    pub fn callback_path(&self) -> String {
        let path = self.redirect.path();
        if path.is_empty() {
            "/".to_string()
        } else {
            path.to_string()
        }
    }
}

/// Validates a redirect URI and returns it parsed.
///
/// Only plain `http` URLs with an explicit port on `localhost` or `127.0.0.1`
/// are accepted, since the redirect is caught by a listener on this machine.
pub fn parse_redirect_uri(raw: &str) -> Res<Url> {
    let invalid = |reason: String| TempoError::InvalidConfig {
        name: REDIRECT_URI_VAR,
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(format!("'{}' is not a URL: {}", raw, e)))?;

    if url.scheme() != "http" {
        return Err(invalid(format!(
            "scheme must be http, got '{}'",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some("localhost") | Some("127.0.0.1") => {}
        Some(host) => {
            return Err(invalid(format!(
                "host must be localhost or 127.0.0.1, got '{}'",
                host
            )));
        }
        None => return Err(invalid("missing host".to_string())),
    }

    if url.port().is_none() {
        return Err(invalid(format!("'{}' needs an explicit port", raw)));
    }

    Ok(url)
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Directory holding the `.env` file and the token cache.
///
/// - Linux: `~/.local/share/tempo-organizer`
/// - macOS: `~/Library/Application Support/tempo-organizer`
/// - Windows: `%LOCALAPPDATA%/tempo-organizer`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Loads environment variables from `.env` files.
///
/// Reads `.env` in the working directory first and then the one in
/// [`data_dir`]. Variables that are already set are never overridden, and
/// missing files are not an error.
///
/// # Errors
///
/// Fails when the data directory cannot be created or a present `.env` file
/// cannot be read or parsed.
pub async fn load_env() -> Res<()> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir).await?;

    load_env_file(&env::current_dir()?.join(".env"))?;
    load_env_file(&dir.join(".env"))?;

    Ok(())
}

/// Loads a single `.env` file into the process environment.
///
/// # Arguments
///
/// * `path` - Location of the file
///
/// # Returns
///
/// `Ok(true)` if the file was loaded, `Ok(false)` if it does not exist.
///
/// # Errors
///
/// Returns [`TempoError::InvalidConfig`] when the file exists but cannot be
/// read or contains an invalid line.
pub fn load_env_file(path: &Path) -> Res<bool> {
    match dotenv::from_path(path) {
        Ok(()) => Ok(true),
        Err(dotenv::Error::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(TempoError::InvalidConfig {
            name: "dotenv",
            reason: format!("{}: {}", path.display(), e),
        }),
    }
}
