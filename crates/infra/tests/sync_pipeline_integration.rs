//! End-to-end cycle over HTTP: token cache, destination client, orchestrator
//! and error log wired together against mock auth and API servers.

mod support;

use std::sync::Arc;
use std::time::Duration;

use paramsync_core::{CycleOutcome, ErrorSink, SyncCycleConfig, SyncService};
use paramsync_domain::{ErrorKind, ParameterReading};
use paramsync_infra::{DestinationClient, ErrorLog, HttpClient, RetryPolicy, TokenCache};
use serde_json::json;
use support::{api_config, auth_config, init_tracing, mount_token_endpoint, FixedSource};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Pipeline {
    service: SyncService,
    source: FixedSource,
    errors: Arc<ErrorLog>,
}

fn pipeline(
    auth_server: &MockServer,
    api_server: &MockServer,
    rows: Vec<ParameterReading>,
) -> Pipeline {
    let http = HttpClient::builder().timeout(Duration::from_secs(5)).build().unwrap();
    let tokens = Arc::new(TokenCache::new(http.clone(), auth_config(auth_server)));
    let destination = DestinationClient::new(
        http,
        tokens,
        &api_config(api_server),
        RetryPolicy::new(2, Duration::from_millis(1)),
    )
    .unwrap();

    let source = FixedSource::new(rows);
    let errors = Arc::new(ErrorLog::new());
    let service = SyncService::new(
        Arc::new(source.clone()),
        Arc::new(destination),
        Arc::clone(&errors) as Arc<dyn ErrorSink>,
        SyncCycleConfig { throttle: Duration::ZERO, ..SyncCycleConfig::default() },
    );

    Pipeline { service, source, errors }
}

async fn mount_healthy_collection(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/crushers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn pushes_only_changed_values_across_cycles() {
    init_tracing();
    let auth = MockServer::start().await;
    let api = MockServer::start().await;
    mount_token_endpoint(&auth, "tok").await;
    mount_healthy_collection(&api).await;

    Mock::given(method("PATCH"))
        .and(path("/api/crushers/BIN1/interfaces/CITEC/parameters/FeedRate"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&api)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/crushers/BIN2/interfaces/CITEC/parameters/Gap"))
        .and(body_json(json!({ "value": 0.0 })))
        .respond_with(ResponseTemplate::new(200))
        .mount(&api)
        .await;

    let p = pipeline(
        &auth,
        &api,
        vec![
            ParameterReading::new(1, "FeedRate", Some(42.0), 1_700_000_000),
            ParameterReading::new(2, "Gap", None, 1_700_000_000),
        ],
    );

    let first = p.service.run_once().await;
    assert_eq!(first.updates_applied, 2);

    let second = p.service.run_once().await;
    assert_eq!(second.changes_detected, 0);

    p.source.replace(vec![
        ParameterReading::new(1, "FeedRate", Some(43.0), 1_700_000_060),
        ParameterReading::new(2, "Gap", None, 1_700_000_060),
    ]);
    let third = p.service.run_once().await;
    assert_eq!(third.changes_detected, 1);

    let patches = api
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "PATCH")
        .count();
    assert_eq!(patches, 3);

    // one token serves every request within its lifetime
    assert_eq!(auth.received_requests().await.unwrap().len(), 1);
    assert!(p.errors.is_empty());
}

#[tokio::test]
async fn unhealthy_destination_skips_cycle_and_is_logged() {
    init_tracing();
    let auth = MockServer::start().await;
    let api = MockServer::start().await;
    mount_token_endpoint(&auth, "tok").await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&api)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&api)
        .await;

    let p = pipeline(&auth, &api, vec![ParameterReading::new(1, "FeedRate", Some(1.0), 0)]);
    let report = p.service.run_once().await;

    assert!(matches!(report.outcome, CycleOutcome::Unhealthy(_)));
    assert!(p.service.cache_snapshot().is_empty());

    let entries = p.errors.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, ErrorKind::HealthCheck);
    assert!(entries[0].message.contains("503"));
}

#[tokio::test]
async fn rejected_update_is_logged_and_not_retried_next_cycle() {
    init_tracing();
    let auth = MockServer::start().await;
    let api = MockServer::start().await;
    mount_token_endpoint(&auth, "tok").await;
    mount_healthy_collection(&api).await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(422).set_body_string("value out of range"))
        .expect(1)
        .mount(&api)
        .await;

    let p = pipeline(&auth, &api, vec![ParameterReading::new(5, "Css", Some(-1.0), 0)]);

    let first = p.service.run_once().await;
    let second = p.service.run_once().await;

    assert_eq!(first.updates_failed, 1);
    assert_eq!(second.changes_detected, 0);

    let entries = p.errors.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, ErrorKind::Api);
    assert!(entries[0].message.contains("value out of range"));
}

#[tokio::test]
async fn token_endpoint_outage_fails_health_gate() {
    init_tracing();
    let auth = MockServer::start().await;
    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&auth)
        .await;
    mount_healthy_collection(&api).await;

    let p = pipeline(&auth, &api, vec![ParameterReading::new(1, "FeedRate", Some(1.0), 0)]);
    let report = p.service.run_once().await;

    assert!(matches!(report.outcome, CycleOutcome::Unhealthy(_)));
    assert!(p.errors.entries()[0].message.contains("no access token"));
}

#[tokio::test]
async fn persistent_rate_limit_is_counted_not_logged_as_error() {
    init_tracing();
    let auth = MockServer::start().await;
    let api = MockServer::start().await;
    mount_token_endpoint(&auth, "tok").await;
    mount_healthy_collection(&api).await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&api)
        .await;

    let p = pipeline(&auth, &api, vec![ParameterReading::new(1, "FeedRate", Some(9.0), 0)]);
    let report = p.service.run_once().await;

    assert_eq!(report.updates_rate_limited, 1);
    assert!(p.errors.is_empty());
}
