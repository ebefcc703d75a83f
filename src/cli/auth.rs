use crate::{
    Res, TempoError,
    config::Config,
    error, info,
    management::TokenManager,
    spotify::{self, SpotifyClient},
    success,
};

pub async fn auth(config: &Config) {
    if let Err(e) = authorize_and_persist(config).await {
        error!("{}", e);
    }
    success!("Authentication successful!");
}

/// Runs the authorization flow and caches the resulting token.
pub async fn authorize_and_persist(config: &Config) -> Res<TokenManager> {
    let token = spotify::auth::authorize(config).await?;
    let token_mgr = TokenManager::new(token);
    token_mgr.persist().await?;
    Ok(token_mgr)
}

/// Opens an API session, authorizing first when no token is cached.
pub async fn connect(config: &Config) -> Res<SpotifyClient> {
    let token_mgr = match TokenManager::load().await {
        Ok(token_mgr) => token_mgr,
        Err(TempoError::NoToken) => {
            info!("No cached token found, starting authorization.");
            authorize_and_persist(config).await?
        }
        Err(e) => return Err(e),
    };

    SpotifyClient::connect(config.clone(), token_mgr).await
}
