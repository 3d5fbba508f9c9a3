//! Shared helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;
use uuid::Uuid;

use hrbridge_api::state::AppState;
use hrbridge_core::case::CaseClient;
use hrbridge_core::clock::Clock;
use hrbridge_core::event::EventStatus;
use hrbridge_core::risk::RiskPolicy;
use hrbridge_core::store::EventStore;
use hrbridge_core::sync::SyncAdapter;
use hrbridge_processor::{
    BadgeAccessAdapter, EmployeeDirectoryAdapter, EventProcessor, JobQueue, NotificationAdapter,
    ProcessorConfig,
};
use hrbridge_store::SqliteEventStore;
use hrbridge_test_support::{FixedClock, RecordingCaseClient};

/// A fully wired application over a test database, with handles onto the
/// store and the recording case client for assertions.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<SqliteEventStore>,
    pub case_client: Arc<RecordingCaseClient>,
}

/// Builds the app with a recording case client and a fixed clock.
pub fn build_test_app(pool: SqlitePool) -> TestApp {
    let case_client = Arc::new(RecordingCaseClient::new());
    let (router, store) =
        build_app_with_case_client(pool, Arc::clone(&case_client) as Arc<dyn CaseClient>);
    TestApp {
        router,
        store,
        case_client,
    }
}

/// Builds the app around an arbitrary case client, for wiremock-backed
/// passthrough tests.
pub fn build_app_with_case_client(
    pool: SqlitePool,
    case_client: Arc<dyn CaseClient>,
) -> (Router, Arc<SqliteEventStore>) {
    let store = Arc::new(SqliteEventStore::new(pool));
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2026, 8, 20, 12, 0, 0).unwrap(),
    ));
    let adapters: Vec<Arc<dyn SyncAdapter>> = vec![
        Arc::new(EmployeeDirectoryAdapter),
        Arc::new(BadgeAccessAdapter),
        Arc::new(NotificationAdapter),
    ];
    let processor = Arc::new(EventProcessor::new(
        Arc::clone(&store) as Arc<dyn EventStore>,
        Arc::clone(&case_client),
        adapters,
        RiskPolicy::default(),
        Arc::clone(&clock),
        ProcessorConfig::default(),
    ));
    let jobs = JobQueue::start(Arc::clone(&processor));
    let state = AppState::new(
        Arc::clone(&store) as Arc<dyn EventStore>,
        case_client,
        clock,
        processor,
        jobs,
    );

    (hrbridge_api::router().with_state(state), store)
}

/// Sends a request through the router and decodes the JSON response body.
/// An empty body decodes to `Value::Null`.
pub async fn send_request(
    router: Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send_request(router, "POST", uri, Some(body)).await
}

pub async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    send_request(router, "GET", uri, None).await
}

/// Polls the store until the event reaches `expected`, panicking after a
/// couple of seconds. Background processing has no completion signal, so
/// tests observe it through the store.
pub async fn wait_for_status(store: &SqliteEventStore, id: Uuid, expected: EventStatus) {
    for _ in 0..200 {
        if store.get(id).await.unwrap().status == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("event {id} did not reach {expected} in time");
}
