//! Metrics and dashboard endpoints.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::instrument;

use hrbridge_core::event::{BridgeEvent, EventStatus};
use hrbridge_core::store::{EventFilter, EventMetrics};

use crate::error::ApiError;
use crate::state::AppState;

/// Trailing window the metrics endpoints report over.
const WINDOW_DAYS: i64 = 7;

/// Number of recent events shown on the dashboard.
const RECENT_EVENTS: i64 = 10;

/// Response body for `GET /dashboard`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// When this snapshot was taken.
    pub generated_at: DateTime<Utc>,
    /// Aggregate counts over the trailing window.
    pub metrics: EventMetrics,
    /// Events currently in `failed` within the window.
    pub failed_count: i64,
    /// Most recent events, newest first.
    pub recent_events: Vec<BridgeEvent>,
}

/// GET /metrics
#[instrument(skip(state))]
async fn get_metrics(State(state): State<AppState>) -> Result<Json<EventMetrics>, ApiError> {
    let since = state.clock.now() - Duration::days(WINDOW_DAYS);
    let metrics = state.store.metrics(since).await?;
    Ok(Json(metrics))
}

/// GET /dashboard
#[instrument(skip(state))]
async fn get_dashboard(State(state): State<AppState>) -> Result<Json<Dashboard>, ApiError> {
    let now = state.clock.now();
    let since = now - Duration::days(WINDOW_DAYS);

    let metrics = state.store.metrics(since).await?;
    let failed_count = metrics
        .by_status
        .get(EventStatus::Failed.as_str())
        .copied()
        .unwrap_or(0);
    let recent_events = state
        .store
        .list(&EventFilter {
            limit: RECENT_EVENTS,
            ..EventFilter::default()
        })
        .await?;

    Ok(Json(Dashboard {
        generated_at: now,
        metrics,
        failed_count,
        recent_events,
    }))
}

/// Returns the metrics router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/metrics", get(get_metrics))
        .route("/dashboard", get(get_dashboard))
}
