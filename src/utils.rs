use std::collections::HashSet;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use reqwest::Url;

use crate::{Res, TempoError, config::Config, config::SPOTIFY_SCOPE, types::CallbackParams};

/// Largest delay suggested by `Retry-After` that is still waited out.
pub const MAX_RETRY_AFTER_SECS: u64 = 120;

pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// Value of the `Authorization` header for client credential requests.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", client_id, client_secret))
    )
}

/// Builds the URL the user has to open to grant access.
pub fn authorize_url(config: &Config, state: &str) -> Res<String> {
    let url = Url::parse_with_params(
        &config.auth_url,
        &[
            ("client_id", config.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("state", state),
            ("scope", SPOTIFY_SCOPE),
            ("show_dialog", "true"),
        ],
    )
    .map_err(|e| TempoError::InvalidConfig {
        name: crate::config::AUTH_URL_VAR,
        reason: e.to_string(),
    })?;

    Ok(url.to_string())
}

/// Checks the query of an authorization redirect and returns the code.
pub fn validate_callback(params: &CallbackParams, expected_state: &str) -> Res<String> {
    if let Some(err) = &params.error {
        return Err(TempoError::Auth(format!("authorization denied: {}", err)));
    }

    match params.state.as_deref() {
        Some(state) if state == expected_state => {}
        _ => {
            return Err(TempoError::Auth(
                "state returned by Spotify does not match the one sent".to_string(),
            ));
        }
    }

    params
        .code
        .clone()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| TempoError::Auth("missing authorization code".to_string()))
}

pub fn track_uri(track_id: &str) -> String {
    format!("spotify:track:{}", track_id)
}

/// Parses a `Retry-After` header value in seconds, defaulting to 1.
pub fn parse_retry_after(value: Option<&str>) -> u64 {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(1)
}

/// Removes repeated ids, keeping the first occurrence.
pub fn remove_duplicate_ids(ids: &mut Vec<String>) {
    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(id.clone()));
}

pub fn now_secs() -> u64 {
    Utc::now().timestamp() as u64
}
