//! Cached client-credentials token
//!
//! Holds at most one [`AuthToken`]. A token is handed out until 60 seconds
//! before its advertised expiry; after that the next caller fetches a new
//! one. The cache mutex is held across the refresh, so concurrent callers
//! wait for the in-flight request instead of issuing their own.

use std::sync::Arc;

use async_trait::async_trait;
use paramsync_core::{AccessTokenProvider, Clock, SystemClock};
use paramsync_domain::{AuthConfig, AuthToken, Result, SyncError};
use reqwest::Method;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::errors::{describe_status, describe_transport};
use crate::http::HttpClient;

/// Successful response from the token endpoint
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Token cache backed by the authorization endpoint
pub struct TokenCache {
    http: HttpClient,
    config: AuthConfig,
    clock: Arc<dyn Clock>,
    cached: Mutex<Option<AuthToken>>,
}

impl TokenCache {
    /// Cache driven by the system clock.
    pub fn new(http: HttpClient, config: AuthConfig) -> Self {
        Self::with_clock(http, config, Arc::new(SystemClock))
    }

    /// Use `clock` for all expiry decisions.
    pub fn with_clock(http: HttpClient, config: AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self { http, config, clock, cached: Mutex::new(None) }
    }

    #[instrument(skip(self), fields(token_url = %self.config.token_url))]
    async fn request_token(&self) -> Result<AuthToken> {
        let form = [
            ("grant_type", "client_credentials"),
            ("scope", self.config.scope.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let request = self.http.request(Method::POST, &self.config.token_url).form(&form);
        let response = self.http.send(request).await.map_err(|err| {
            SyncError::Authentication(format!("token request failed: {}", describe_transport(&err)))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Authentication(format!(
                "token endpoint rejected request: {}",
                describe_status(status, &body)
            )));
        }

        let obtained_at = self.clock.now();
        let parsed: TokenResponse = response.json().await.map_err(|err| {
            SyncError::Authentication(format!("invalid token response: {err}"))
        })?;

        Ok(AuthToken::new(parsed.access_token, parsed.expires_in, obtained_at))
    }
}

#[async_trait]
impl AccessTokenProvider for TokenCache {
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        let now = self.clock.now();

        if let Some(token) = cached.as_ref().filter(|token| !token.is_expired_at(now)) {
            debug!(
                remaining_secs = token.remaining_at(now).as_secs(),
                "Reusing cached access token"
            );
            return Ok(token.access_token.clone());
        }

        let token = self.request_token().await?;
        info!(expires_in_secs = token.expires_in.as_secs(), "Obtained new access token");

        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }
}
