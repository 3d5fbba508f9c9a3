//! HR Bridge API — HTTP surface of the integration bridge.

use axum::Router;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use state::AppState;

/// Builds the full route tree. The caller supplies middleware layers and
/// the application state.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::webhook::router())
        .merge(routes::events::router())
        .merge(routes::pega::router())
        .merge(routes::metrics::router())
}
