use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    Form, Json, Router,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use tempo_organizer::{
    TempoError,
    config::Config,
    management::TokenManager,
    server::{self, CallbackContext},
    spotify::auth::wait_for_token,
    types::{AuthState, Token},
    utils,
};
use tokio::sync::{Mutex, oneshot};

const CLIENT_ID: &str = "client";
const CLIENT_SECRET: &str = "secret";

// Fake token endpoint accepting one authorization code and any refresh token
async fn token_endpoint(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Response {
    let expected = utils::basic_auth_header(CLIENT_ID, CLIENT_SECRET);
    if headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let grant = form.get("grant_type").map(String::as_str);
    let code = form.get("code").map(String::as_str);
    match (grant, code) {
        (Some("authorization_code"), Some("good-code")) => Json(json!({
            "access_token": "fresh-access",
            "token_type": "Bearer",
            "scope": "playlist-read-private",
            "expires_in": 3600,
            "refresh_token": "fresh-refresh"
        }))
        .into_response(),
        (Some("refresh_token"), _) => Json(json!({
            "access_token": "refreshed-access",
            "token_type": "Bearer",
            "expires_in": 3600
        }))
        .into_response(),
        _ => (StatusCode::BAD_REQUEST, r#"{"error":"invalid_grant"}"#).into_response(),
    }
}

async fn start_token_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let app = Router::new().route("/api/token", post(token_endpoint));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("{}/api/token", base)
}

async fn test_config() -> Config {
    let token_url = start_token_endpoint().await;
    let vars = HashMap::from([
        ("SPOTIPY_CLIENT_ID", CLIENT_ID),
        ("SPOTIPY_CLIENT_SECRET", CLIENT_SECRET),
        ("SPOTIPY_REDIRECT_URI", "http://127.0.0.1:8888/callback"),
        ("SPOTIFY_API_TOKEN_URL", token_url.as_str()),
    ]);
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
}

struct CallbackServer {
    base: String,
    auth_state: Arc<Mutex<Option<AuthState>>>,
    shutdown: oneshot::Sender<()>,
}

async fn start_callback_server(config: Config, state: &str) -> CallbackServer {
    let auth_state = Arc::new(Mutex::new(Some(AuthState {
        state: state.to_string(),
        token: None,
        error: None,
    })));

    let listener = server::bind_callback_listener("127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let router = server::callback_router(
        &config.callback_path(),
        CallbackContext {
            auth_state: Arc::clone(&auth_state),
            config: Arc::new(config),
        },
    );
    let (shutdown, shutdown_rx) = oneshot::channel();
    tokio::spawn(server::serve(listener, router, shutdown_rx));

    CallbackServer {
        base,
        auth_state,
        shutdown,
    }
}

async fn get(url: &str) -> String {
    reqwest::get(url).await.unwrap().text().await.unwrap()
}

#[tokio::test]
async fn test_callback_exchanges_code() {
    let config = test_config().await;
    let server = start_callback_server(config, "expected").await;

    let page = get(&format!(
        "{}/callback?code=good-code&state=expected",
        server.base
    ))
    .await;
    assert!(page.contains("successful"));

    let token = wait_for_token(Arc::clone(&server.auth_state), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(token.access_token, "fresh-access");
    assert_eq!(token.refresh_token, "fresh-refresh");

    // a reload keeps the token
    let page = get(&format!("{}/callback?code=other&state=expected", server.base)).await;
    assert!(page.contains("successful"));

    let _ = server.shutdown.send(());
}

#[tokio::test]
async fn test_callback_rejects_state_mismatch() {
    let config = test_config().await;
    let server = start_callback_server(config, "expected").await;

    let page = get(&format!("{}/callback?code=good-code&state=forged", server.base)).await;
    assert!(page.contains("failed"));

    let err = wait_for_token(Arc::clone(&server.auth_state), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, TempoError::Auth(ref msg) if msg.contains("state")));

    let _ = server.shutdown.send(());
}

#[tokio::test]
async fn test_callback_reports_denied_access() {
    let config = test_config().await;
    let server = start_callback_server(config, "expected").await;

    get(&format!("{}/callback?error=access_denied&state=expected", server.base)).await;

    let err = wait_for_token(Arc::clone(&server.auth_state), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, TempoError::Auth(ref msg) if msg.contains("access_denied")));

    let _ = server.shutdown.send(());
}

#[tokio::test]
async fn test_callback_reports_failed_exchange() {
    let config = test_config().await;
    let server = start_callback_server(config, "expected").await;

    get(&format!("{}/callback?code=bad-code&state=expected", server.base)).await;

    let err = wait_for_token(Arc::clone(&server.auth_state), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, TempoError::Auth(ref msg) if msg.contains("token exchange failed")));

    let _ = server.shutdown.send(());
}

#[tokio::test]
async fn test_health() {
    let config = test_config().await;
    let server = start_callback_server(config, "expected").await;

    let body: Value = serde_json::from_str(&get(&format!("{}/health", server.base)).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    let _ = server.shutdown.send(());
}

#[tokio::test]
async fn test_wait_for_token_times_out() {
    let auth_state = Arc::new(Mutex::new(Some(AuthState {
        state: "s".to_string(),
        token: None,
        error: None,
    })));

    let err = wait_for_token(auth_state, Duration::ZERO).await.unwrap_err();
    assert!(matches!(err, TempoError::Auth(_)));
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_persisted() {
    let config = test_config().await;
    let path = std::env::temp_dir().join(format!(
        "tempo-organizer-token-{}.json",
        utils::generate_state()
    ));

    let expired = Token {
        access_token: "old-access".to_string(),
        refresh_token: "old-refresh".to_string(),
        scope: String::new(),
        expires_in: 3600,
        obtained_at: 0,
    };
    let mut manager = TokenManager::with_path(expired, path.clone());
    assert!(manager.is_expired());

    let access = manager.get_valid_token(&config).await.unwrap();
    assert_eq!(access, "refreshed-access");
    assert!(!manager.is_expired());

    let reloaded = TokenManager::load_from(&path).await.unwrap();
    assert_eq!(reloaded.current_token().access_token, "refreshed-access");
    assert_eq!(reloaded.current_token().refresh_token, "old-refresh");

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_missing_token_cache() {
    let path = std::env::temp_dir().join(format!(
        "tempo-organizer-missing-{}.json",
        utils::generate_state()
    ));

    let result = TokenManager::load_from(&path).await;
    assert!(matches!(result, Err(TempoError::NoToken)));
}
