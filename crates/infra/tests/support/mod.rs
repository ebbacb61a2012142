//! Shared helpers for infra integration tests

use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use paramsync_core::ParameterSource;
use paramsync_domain::{AuthConfig, ApiConfig, ParameterReading, Result};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/connect/token";

/// Install a test-friendly tracing subscriber once per process.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("paramsync=debug")
            .with_test_writer()
            .try_init();
    });
}

/// Token endpoint that always issues `token` valid for an hour.
pub async fn mount_token_endpoint(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": token, "expires_in": 3600 })),
        )
        .mount(server)
        .await;
}

pub fn auth_config(server: &MockServer) -> AuthConfig {
    AuthConfig {
        token_url: format!("{}{TOKEN_PATH}", server.uri()),
        client_id: "paramsync".into(),
        client_secret: "s3cret".into(),
        scope: "modular-web-api".into(),
    }
}

pub fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: server.uri(),
        version: "1.0".into(),
        collection_path: "/api/crushers".into(),
        entity_prefix: "BIN".into(),
        interface: "CITEC".into(),
        accept_invalid_certs: false,
        timeout_secs: 5,
    }
}

/// Source that returns the same rows every poll until replaced.
#[derive(Clone, Default)]
pub struct FixedSource {
    rows: Arc<Mutex<Vec<ParameterReading>>>,
}

impl FixedSource {
    pub fn new(rows: Vec<ParameterReading>) -> Self {
        Self { rows: Arc::new(Mutex::new(rows)) }
    }

    pub fn replace(&self, rows: Vec<ParameterReading>) {
        *self.rows.lock().unwrap() = rows;
    }
}

#[async_trait]
impl ParameterSource for FixedSource {
    async fn fetch_latest(&self) -> Result<Vec<ParameterReading>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
