//! Event inspection and reprocessing endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use hrbridge_core::error::BridgeError;
use hrbridge_core::event::{BridgeEvent, EventStatus, EventType};
use hrbridge_core::store::EventFilter;
use hrbridge_processor::Job;

use crate::error::ApiError;
use crate::state::AppState;

const MAX_PAGE_SIZE: i64 = 200;

/// Query parameters for `GET /events`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsQuery {
    /// Filter by processing status.
    pub status: Option<String>,
    /// Filter by event type.
    pub event: Option<String>,
    /// Filter by originating case id.
    pub case_id: Option<String>,
    /// Only events received at or after this instant (RFC 3339).
    pub from: Option<DateTime<Utc>>,
    /// Only events received before this instant (RFC 3339).
    pub to: Option<DateTime<Utc>>,
    /// Page size, clamped to 1..=200.
    pub limit: Option<i64>,
    /// Number of events to skip.
    pub offset: Option<i64>,
}

impl ListEventsQuery {
    /// Translates the raw query into a store filter, rejecting unknown
    /// status or event-type names.
    fn into_filter(self) -> Result<EventFilter, BridgeError> {
        let status = self
            .status
            .map(|raw| {
                raw.parse::<EventStatus>()
                    .map_err(|_| BridgeError::Validation(format!("unknown status '{raw}'")))
            })
            .transpose()?;
        let event_type = self
            .event
            .map(|raw| {
                raw.parse::<EventType>()
                    .map_err(|_| BridgeError::Validation(format!("unknown event type '{raw}'")))
            })
            .transpose()?;

        let defaults = EventFilter::default();
        Ok(EventFilter {
            status,
            event_type,
            case_id: self.case_id,
            received_after: self.from,
            received_before: self.to,
            limit: self.limit.unwrap_or(defaults.limit).clamp(1, MAX_PAGE_SIZE),
            offset: self.offset.unwrap_or(0).max(0),
        })
    }
}

/// Response body for `GET /events`.
#[derive(Debug, Serialize)]
pub struct EventPage {
    /// Events in `received_at` descending order.
    pub events: Vec<BridgeEvent>,
    /// Number of events in this page.
    pub count: usize,
    /// Offset of this page.
    pub offset: i64,
}

/// Response body for an accepted reprocess request.
#[derive(Debug, Serialize)]
pub struct ReprocessAccepted {
    /// The event being reprocessed.
    pub id: Uuid,
    /// Always `processing`: the claim happens before the response.
    pub status: EventStatus,
}

/// GET /events
#[instrument(skip(state, query))]
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<EventPage>, ApiError> {
    let filter = query.into_filter()?;
    let offset = filter.offset;
    let events = state.store.list(&filter).await?;

    Ok(Json(EventPage {
        count: events.len(),
        offset,
        events,
    }))
}

/// GET /events/{id}
#[instrument(skip(state))]
async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BridgeEvent>, ApiError> {
    let event = state.store.get(id).await?;
    Ok(Json(event))
}

/// POST /events/{id}/reprocess
///
/// Claims a failed event back into `processing` before responding, so a
/// concurrent duplicate request observes the claim and gets a 409. The
/// pipeline itself still runs in the background.
#[instrument(skip(state))]
async fn reprocess_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ReprocessAccepted>), ApiError> {
    state.processor.claim_for_reprocess(id).await?;
    state.jobs.enqueue(Job::Resume(id))?;

    info!(event_id = %id, "accepted reprocess request");

    Ok((
        StatusCode::ACCEPTED,
        Json(ReprocessAccepted {
            id,
            status: EventStatus::Processing,
        }),
    ))
}

/// Returns the event inspection router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/{id}", get(get_event))
        .route("/events/{id}/reprocess", post(reprocess_event))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults_match_store_defaults() {
        let filter = ListEventsQuery::default().into_filter().unwrap();
        assert_eq!(filter.limit, 50);
        assert_eq!(filter.offset, 0);
        assert!(filter.status.is_none());
        assert!(filter.event_type.is_none());
    }

    #[test]
    fn test_query_limit_is_clamped() {
        let over = ListEventsQuery {
            limit: Some(10_000),
            ..ListEventsQuery::default()
        };
        assert_eq!(over.into_filter().unwrap().limit, MAX_PAGE_SIZE);

        let under = ListEventsQuery {
            limit: Some(0),
            ..ListEventsQuery::default()
        };
        assert_eq!(under.into_filter().unwrap().limit, 1);
    }

    #[test]
    fn test_query_rejects_unknown_status() {
        let query = ListEventsQuery {
            status: Some("archived".into()),
            ..ListEventsQuery::default()
        };
        assert!(matches!(
            query.into_filter(),
            Err(BridgeError::Validation(_))
        ));
    }

    #[test]
    fn test_query_parses_known_filters() {
        let query = ListEventsQuery {
            status: Some("failed".into()),
            event: Some("department_change".into()),
            case_id: Some("HRSR-WORK-1".into()),
            ..ListEventsQuery::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.status, Some(EventStatus::Failed));
        assert_eq!(filter.event_type, Some(EventType::DepartmentChange));
        assert_eq!(filter.case_id.as_deref(), Some("HRSR-WORK-1"));
    }
}
