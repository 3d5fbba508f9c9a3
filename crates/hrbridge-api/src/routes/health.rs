//! Service liveness endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Liveness report for the bridge and its event store.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// `ok` when every probed component is reachable, `degraded` otherwise.
    pub status: &'static str,
    /// Crate version of the running binary.
    pub version: &'static str,
    /// Event store reachability.
    pub database: &'static str,
}

/// GET /health
///
/// Probes the event store with a cheap aggregate query so a broken
/// database surfaces here rather than on the next webhook.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let database_ok = state.store.metrics(state.clock.now()).await.is_ok();

    let (code, status, database) = if database_ok {
        (StatusCode::OK, "ok", "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable")
    };

    (
        code,
        Json(HealthStatus {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
        }),
    )
}

/// Returns the liveness router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
