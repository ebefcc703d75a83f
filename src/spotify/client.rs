use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode, header::RETRY_AFTER};
use serde::{Serialize, de::DeserializeOwned};
use tokio::time::sleep;

use crate::{
    Res, TempoError,
    config::Config,
    debug,
    management::TokenManager,
    types::{CurrentUser, Paging},
    utils, warning,
};

/// Attempts per request before a retryable status is returned as an error.
const MAX_ATTEMPTS: u32 = 5;

/// Wait before retrying a `502 Bad Gateway`.
const BAD_GATEWAY_DELAY: Duration = Duration::from_secs(10);

/// Authenticated Spotify Web API session for the current user.
pub struct SpotifyClient {
    http: Client,
    config: Config,
    token_mgr: TokenManager,
    user_id: String,
    bad_gateway_delay: Duration,
}

impl SpotifyClient {
    /// Creates a session and resolves the current user's id via `GET /me`.
    ///
    /// # Arguments
    ///
    /// * `config` - API base URL and the credentials needed for refreshes
    /// * `token_mgr` - Token of the user the session acts for
    ///
    /// # Errors
    ///
    /// Fails if the token cannot be refreshed or `GET /me` is rejected.
    ///
    /// # Example
    ///
    /// ```
    /// let token_mgr = TokenManager::load().await?;
    /// let mut client = SpotifyClient::connect(config, token_mgr).await?;
    /// println!("{}", client.user_id());
    /// ```
    pub async fn connect(config: Config, token_mgr: TokenManager) -> Res<Self> {
        let mut client = Self {
            http: Client::new(),
            config,
            token_mgr,
            user_id: String::new(),
            bad_gateway_delay: BAD_GATEWAY_DELAY,
        };

        let url = client.url("/me");
        let me: CurrentUser = client.get_json(&url).await?;
        debug!(
            "Authenticated as {} ({})",
            me.display_name.as_deref().unwrap_or("unknown"),
            me.id
        );
        client.user_id = me.id;

        Ok(client)
    }

    /// Overrides the delay before a `502 Bad Gateway` is retried.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.bad_gateway_delay = delay;
        self
    }

    /// Spotify id of the user the session acts for.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url, path)
    }

    /// Sends a bearer-authenticated request.
    ///
    /// `502 Bad Gateway` is retried after a fixed delay. `429 Too Many Requests`
    /// is retried after the advised `Retry-After` delay if that is at most
    /// [`utils::MAX_RETRY_AFTER_SECS`]; a longer delay fails with
    /// [`TempoError::RateLimited`]. Any other non-success status fails with
    /// [`TempoError::Api`].
    pub(crate) async fn send(
        &mut self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Res<Response> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let token = self.token_mgr.get_valid_token(&self.config).await?;
            let mut request = self.http.request(method.clone(), url).bearer_auth(token);
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            match status {
                StatusCode::BAD_GATEWAY if attempt < MAX_ATTEMPTS => {
                    debug!("{} {} returned 502, retrying", method, url);
                    sleep(self.bad_gateway_delay).await;
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = utils::parse_retry_after(
                        response
                            .headers()
                            .get(RETRY_AFTER)
                            .and_then(|v| v.to_str().ok()),
                    );

                    if retry_after > utils::MAX_RETRY_AFTER_SECS || attempt >= MAX_ATTEMPTS {
                        return Err(TempoError::RateLimited(retry_after));
                    }

                    warning!("Rate limited, retrying in {} seconds.", retry_after);
                    sleep(Duration::from_secs(retry_after)).await;
                }
                _ => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(TempoError::Api { status, body });
                }
            }
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&mut self, url: &str) -> Res<T> {
        let response = self.send(Method::GET, url, None).await?;
        Ok(response.json::<T>().await?)
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &mut self,
        url: &str,
        body: &B,
    ) -> Res<T> {
        let body = serde_json::to_value(body)?;
        let response = self.send(Method::POST, url, Some(&body)).await?;
        Ok(response.json::<T>().await?)
    }

    pub(crate) async fn delete(&mut self, url: &str) -> Res<()> {
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    /// Collects the items of every page, following `next` until it is null.
    pub(crate) async fn get_all_pages<T: DeserializeOwned>(&mut self, url: String) -> Res<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(url);

        while let Some(url) = next {
            let page: Paging<T> = self.get_json(&url).await?;
            items.extend(page.items);
            next = page.next;
        }

        Ok(items)
    }
}
