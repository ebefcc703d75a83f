use std::collections::HashMap;

use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Url;
use tempo_organizer::{
    TempoError,
    config::{Config, SPOTIFY_SCOPE},
    types::CallbackParams,
    utils::*,
};

// Helper to create a test configuration
fn test_config() -> Config {
    let map: HashMap<&str, &str> = HashMap::from([
        ("SPOTIPY_CLIENT_ID", "my-client"),
        ("SPOTIPY_CLIENT_SECRET", "my-secret"),
        ("SPOTIPY_REDIRECT_URI", "http://127.0.0.1:8888/callback"),
    ]);
    Config::from_lookup(|key| map.get(key).map(|v| v.to_string())).unwrap()
}

// Helper to create callback parameters
fn params(code: Option<&str>, state: Option<&str>, error: Option<&str>) -> CallbackParams {
    CallbackParams {
        code: code.map(str::to_string),
        state: state.map(str::to_string),
        error: error.map(str::to_string),
    }
}

#[test]
fn test_generate_state() {
    let state = generate_state();

    // Should be exactly 64 characters
    assert_eq!(state.len(), 64);

    // Should contain only alphanumeric characters
    assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated states should be different
    assert_ne!(state, generate_state());
}

#[test]
fn test_basic_auth_header() {
    let header = basic_auth_header("id", "secret");
    assert!(header.starts_with("Basic "));

    let decoded = STANDARD.decode(&header["Basic ".len()..]).unwrap();
    assert_eq!(String::from_utf8(decoded).unwrap(), "id:secret");
}

#[test]
fn test_authorize_url() {
    let config = test_config();
    let url = Url::parse(&authorize_url(&config, "xyz").unwrap()).unwrap();

    assert_eq!(url.host_str(), Some("accounts.spotify.com"));
    assert_eq!(url.path(), "/authorize");

    let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
    assert_eq!(query["client_id"], "my-client");
    assert_eq!(query["response_type"], "code");
    assert_eq!(query["redirect_uri"], "http://127.0.0.1:8888/callback");
    assert_eq!(query["state"], "xyz");
    assert_eq!(query["scope"], SPOTIFY_SCOPE);
    assert_eq!(query["show_dialog"], "true");
    // the secret never leaves through the browser
    assert!(!url.as_str().contains("my-secret"));
}

#[test]
fn test_validate_callback_success() {
    let code = validate_callback(&params(Some("abc"), Some("s1"), None), "s1").unwrap();
    assert_eq!(code, "abc");
}

#[test]
fn test_validate_callback_failures() {
    // user denied access
    let err = validate_callback(&params(None, Some("s1"), Some("access_denied")), "s1").unwrap_err();
    assert!(matches!(err, TempoError::Auth(ref msg) if msg.contains("access_denied")));

    // state mismatch
    let err = validate_callback(&params(Some("abc"), Some("other"), None), "s1").unwrap_err();
    assert!(matches!(err, TempoError::Auth(ref msg) if msg.contains("state")));

    // state missing
    assert!(validate_callback(&params(Some("abc"), None, None), "s1").is_err());

    // code missing or empty
    assert!(validate_callback(&params(None, Some("s1"), None), "s1").is_err());
    assert!(validate_callback(&params(Some(""), Some("s1"), None), "s1").is_err());
}

#[test]
fn test_track_uri() {
    assert_eq!(
        track_uri("4ibzxSKw3a6rtIorruN5GO"),
        "spotify:track:4ibzxSKw3a6rtIorruN5GO"
    );
}

#[test]
fn test_parse_retry_after() {
    assert_eq!(parse_retry_after(Some("30")), 30);
    assert_eq!(parse_retry_after(Some(" 7 ")), 7);
    assert_eq!(parse_retry_after(Some("soon")), 1);
    assert_eq!(parse_retry_after(None), 1);
}

#[test]
fn test_remove_duplicate_ids() {
    let mut ids = vec![
        "id1".to_string(),
        "id2".to_string(),
        "id1".to_string(),
        "id3".to_string(),
        "id2".to_string(),
    ];

    remove_duplicate_ids(&mut ids);

    // Should contain the first occurrence of each unique ID
    assert_eq!(ids, vec!["id1", "id2", "id3"]);
}
