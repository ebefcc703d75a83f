use std::{sync::Arc, time::Duration};

use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderValue},
};
use tokio::sync::{Mutex, oneshot};

use crate::{
    Res, TempoError,
    config::Config,
    debug, info,
    server::{self, CallbackContext},
    types::{AuthState, Token, TokenResponse},
    utils, warning,
};

/// Runs the OAuth 2.0 authorization code flow and returns the new token.
///
/// 1. Binds the local listener at the redirect URI's address (both loopback
///    addresses for `localhost`)
/// 2. Opens the authorization URL in the browser (or prints it)
/// 3. Waits for the redirect, validates `state` and exchanges the code
/// 4. Shuts the listener down again
///
/// The consent dialog is always shown, so a different account can be picked.
///
/// # Errors
///
/// Fails if the listener cannot be bound, the user denies access, the state
/// check or the code exchange fails, or no redirect arrives within
/// `config.auth_timeout`.
pub async fn authorize(config: &Config) -> Res<Token> {
    let state = utils::generate_state();
    let auth_url = utils::authorize_url(config, &state)?;

    let shared_state: Arc<Mutex<Option<AuthState>>> = Arc::new(Mutex::new(Some(AuthState {
        state,
        token: None,
        error: None,
    })));

    let router = server::callback_router(
        &config.callback_path(),
        CallbackContext {
            auth_state: Arc::clone(&shared_state),
            config: Arc::new(config.clone()),
        },
    );

    let mut shutdown_senders = Vec::new();
    let mut server_handles = Vec::new();
    for (index, addr) in config.callback_addrs().into_iter().enumerate() {
        let listener = match server::bind_callback_listener(addr).await {
            Ok(listener) => listener,
            // only the first (IPv4) address is required
            Err(e) if index > 0 => {
                debug!("Skipping callback listener on {}: {}", addr, e);
                continue;
            }
            Err(e) => return Err(e),
        };
        debug!("Callback listener bound to {}", addr);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        shutdown_senders.push(shutdown_tx);
        server_handles.push(tokio::spawn(server::serve(
            listener,
            router.clone(),
            shutdown_rx,
        )));
    }

    info!("Approve the authorization request in your browser to complete login.");
    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let result = wait_for_token(Arc::clone(&shared_state), config.auth_timeout).await;

    for shutdown_tx in shutdown_senders {
        let _ = shutdown_tx.send(());
    }
    for handle in server_handles {
        match handle.await {
            Ok(Err(e)) => warning!("Callback listener stopped with an error: {}", e),
            Err(e) => warning!("Callback listener task failed: {}", e),
            Ok(Ok(())) => {}
        }
    }

    result
}

/// Polls the shared state once per second until the callback handler has
/// stored a token or an error, or `max_wait` has elapsed.
pub async fn wait_for_token(
    shared_state: Arc<Mutex<Option<AuthState>>>,
    max_wait: Duration,
) -> Res<Token> {
    use std::time::Instant;

    let start = Instant::now();

    loop {
        {
            let lock = shared_state.lock().await;
            if let Some(auth_state) = lock.as_ref() {
                if let Some(token) = &auth_state.token {
                    return Ok(token.clone());
                }
                if let Some(err) = &auth_state.error {
                    return Err(TempoError::Auth(err.clone()));
                }
            }
        }

        if start.elapsed() >= max_wait {
            return Err(TempoError::Auth(format!(
                "no redirect received within {} seconds",
                max_wait.as_secs()
            )));
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

/// Exchanges an authorization code for an access token.
///
/// # Arguments
///
/// * `config` - Token endpoint, client credentials and redirect URI
/// * `code` - The `code` parameter of the authorization redirect
///
/// # Errors
///
/// Returns [`TempoError::Api`] if the endpoint rejects the code and
/// [`TempoError::Auth`] if the response carries no refresh token.
pub async fn exchange_code(config: &Config, code: &str) -> Res<Token> {
    let response = request_token(
        config,
        &[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
        ],
    )
    .await?;

    token_from_response(response, None)
}

/// Exchanges a refresh token for a fresh access token.
///
/// Spotify may omit the refresh token in the response; the previous one is
/// kept in that case.
///
/// # Errors
///
/// Returns [`TempoError::Api`] if the endpoint rejects the refresh token.
pub async fn refresh_token(config: &Config, refresh_token: &str) -> Res<Token> {
    let response = request_token(
        config,
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ],
    )
    .await?;

    token_from_response(response, Some(refresh_token))
}

async fn request_token(config: &Config, form: &[(&str, &str)]) -> Res<TokenResponse> {
    let auth_header = HeaderValue::from_str(&utils::basic_auth_header(
        &config.client_id,
        &config.client_secret,
    ))
    .map_err(|e| TempoError::InvalidConfig {
        name: crate::config::CLIENT_SECRET_VAR,
        reason: e.to_string(),
    })?;

    let response = Client::new()
        .post(&config.token_url)
        .header(AUTHORIZATION, auth_header)
        .form(form)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TempoError::Api { status, body });
    }

    Ok(response.json::<TokenResponse>().await?)
}

/// Turns a token endpoint response into a cacheable [`Token`].
pub fn token_from_response(response: TokenResponse, previous_refresh: Option<&str>) -> Res<Token> {
    let refresh_token = match (response.refresh_token, previous_refresh) {
        (Some(token), _) if !token.is_empty() => token,
        (_, Some(previous)) => previous.to_string(),
        _ => {
            return Err(TempoError::Auth(
                "token response did not contain a refresh token".to_string(),
            ));
        }
    };

    Ok(Token {
        access_token: response.access_token,
        refresh_token,
        scope: response.scope,
        expires_in: response.expires_in,
        obtained_at: utils::now_secs(),
    })
}
