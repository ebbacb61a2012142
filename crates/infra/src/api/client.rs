//! Destination API client with rate-limit retry
//!
//! Provides the two calls the sync cycle needs: a PATCH per changed parameter
//! and an authenticated GET on the collection used as a health check.

use std::sync::Arc;

use async_trait::async_trait;
use paramsync_core::{AccessTokenProvider, ParameterDestination};
use paramsync_domain::{
    ApiConfig, ParameterUpdate, Result, SyncConfig, SyncError, UpdateOutcome,
};
use reqwest::{Method, StatusCode};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use super::endpoints::Endpoints;
use crate::errors::{describe_status, describe_transport};
use crate::http::{HttpClient, RetryPolicy};

const UPDATE_OPERATION: &str = "update";
const DESTINATION_SERVICE: &str = "destination API";

/// Client for the destination control system
pub struct DestinationClient {
    http: HttpClient,
    auth: Arc<dyn AccessTokenProvider>,
    endpoints: Endpoints,
    retry: RetryPolicy,
}

impl DestinationClient {
    /// Create a new destination client
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Config` if the base URL cannot be parsed.
    pub fn new(
        http: HttpClient,
        auth: Arc<dyn AccessTokenProvider>,
        api: &ApiConfig,
        retry: RetryPolicy,
    ) -> Result<Self> {
        Ok(Self { http, auth, endpoints: Endpoints::from_config(api)?, retry })
    }

    /// Build the HTTP client and retry policy from configuration.
    pub fn from_config(
        auth: Arc<dyn AccessTokenProvider>,
        api: &ApiConfig,
        sync: &SyncConfig,
    ) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(api.timeout())
            .accept_invalid_certs(api.accept_invalid_certs)
            .build()?;

        if api.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for the destination API");
        }

        Self::new(http, auth, api, RetryPolicy::from_config(sync))
    }

    /// PATCH a single parameter value.
    ///
    /// Retries only on 429, up to the policy's retry budget. Exhausting the
    /// budget is reported as [`UpdateOutcome::RateLimited`], not as an error.
    ///
    /// # Errors
    ///
    /// `SyncError::Api` for token failures, transport failures, and any
    /// non-success status other than 429.
    #[instrument(
        skip(self, update),
        fields(entity_id = update.entity_id, parameter = %update.parameter_name)
    )]
    /// PATCH one value, backing off on `429 Too Many Requests`.
    pub async fn update_parameter(&self, update: &ParameterUpdate) -> Result<UpdateOutcome> {
        let url = self.endpoints.parameter(update.entity_id, &update.parameter_name);
        let body = json!({ "value": update.value });
        let api_error = |details: String| {
            SyncError::api(UPDATE_OPERATION, update.entity_id, update.parameter_name.clone(), details)
        };

        let mut retry = 0;
        loop {
            let token = self
                .auth
                .access_token()
                .await
                .map_err(|err| api_error(format!("no access token: {err}")))?;

            let request = self
                .http
                .request(Method::PATCH, url.clone())
                .bearer_auth(token)
                .json(&body);
            let response = self
                .http
                .send(request)
                .await
                .map_err(|err| api_error(describe_transport(&err)))?;

            let status = response.status();
            if status.is_success() {
                info!(value = update.value, %status, "Parameter updated");
                return Ok(UpdateOutcome::Applied);
            }

            if status != StatusCode::TOO_MANY_REQUESTS {
                let body = response.text().await.unwrap_or_default();
                return Err(api_error(describe_status(status, &body)));
            }

            if retry >= self.retry.max_retries() {
                return Ok(UpdateOutcome::RateLimited { attempts: self.retry.max_attempts() });
            }

            retry += 1;
            let delay = self.retry.delay_for(retry);
            warn!(
                retry,
                max_retries = self.retry.max_retries(),
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Rate limited by destination; backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Authenticated GET on the collection. Only `200 OK` passes.
    ///
    /// # Errors
    ///
    /// `SyncError::HealthCheck` for any other status, transport failure or
    /// token failure.
    #[instrument(skip(self))]
    pub async fn check_health(&self) -> Result<()> {
        let unhealthy = |details: String| SyncError::health_check(DESTINATION_SERVICE, details);

        let token = self
            .auth
            .access_token()
            .await
            .map_err(|err| unhealthy(format!("no access token: {err}")))?;

        let request = self.http.request(Method::GET, self.endpoints.collection()).bearer_auth(token);
        let response =
            self.http.send(request).await.map_err(|err| unhealthy(describe_transport(&err)))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(unhealthy(describe_status(status, &body)));
        }

        debug!("Destination API healthy");
        Ok(())
    }
}

#[async_trait]
impl ParameterDestination for DestinationClient {
    async fn check_health(&self) -> Result<()> {
        DestinationClient::check_health(self).await
    }

    async fn update_parameter(&self, update: &ParameterUpdate) -> Result<UpdateOutcome> {
        DestinationClient::update_parameter(self, update).await
    }
}
