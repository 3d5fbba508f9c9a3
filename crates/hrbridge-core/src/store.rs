//! Event store abstraction.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::BridgeError;
use crate::event::{BridgeEvent, EventStatus, EventType, RiskLevel};

/// Filter and pagination parameters for listing events.
#[derive(Debug, Clone)]
pub struct EventFilter {
    /// Only events in this status.
    pub status: Option<EventStatus>,
    /// Only events of this type.
    pub event_type: Option<EventType>,
    /// Only events referencing this case.
    pub case_id: Option<String>,
    /// Only events received at or after this instant.
    pub received_after: Option<DateTime<Utc>>,
    /// Only events received before this instant.
    pub received_before: Option<DateTime<Utc>>,
    /// Maximum number of events to return.
    pub limit: i64,
    /// Number of events to skip, in `received_at` descending order.
    pub offset: i64,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            status: None,
            event_type: None,
            case_id: None,
            received_after: None,
            received_before: None,
            limit: 50,
            offset: 0,
        }
    }
}

/// A requested status transition with the fields written alongside it.
///
/// Every transition rewrites `risk_level`, `error_detail`, and
/// `processed_at`, so entering `processing` clears the previous attempt's
/// outcome and a reprocessed event carries only its latest evaluation.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    /// The target status.
    pub to: EventStatus,
    /// Risk classification to record, if evaluated.
    pub risk_level: Option<RiskLevel>,
    /// Failure or callback detail to record.
    pub error_detail: Option<String>,
    /// When processing finished, for terminal transitions.
    pub processed_at: Option<DateTime<Utc>>,
}

impl StatusUpdate {
    /// Claim the event for processing, clearing any previous outcome.
    #[must_use]
    pub fn processing() -> Self {
        Self {
            to: EventStatus::Processing,
            risk_level: None,
            error_detail: None,
            processed_at: None,
        }
    }

    /// Mark the event completed.
    #[must_use]
    pub fn completed(
        risk_level: RiskLevel,
        error_detail: Option<String>,
        processed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            to: EventStatus::Completed,
            risk_level: Some(risk_level),
            error_detail,
            processed_at: Some(processed_at),
        }
    }

    /// Mark the event failed.
    #[must_use]
    pub fn failed(
        risk_level: Option<RiskLevel>,
        error_detail: String,
        processed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            to: EventStatus::Failed,
            risk_level,
            error_detail: Some(error_detail),
            processed_at: Some(processed_at),
        }
    }
}

/// Aggregate counts over a trailing window. Pure read, no side effects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetrics {
    /// Start of the window the counts cover.
    pub since: DateTime<Utc>,
    /// Total events received in the window.
    pub total: i64,
    /// Counts keyed by status.
    pub by_status: BTreeMap<String, i64>,
    /// Counts keyed by event type.
    pub by_event_type: BTreeMap<String, i64>,
    /// Counts keyed by risk level (evaluated events only).
    pub by_risk_level: BTreeMap<String, i64>,
}

/// Durable record of every received event and its processing outcome.
///
/// All mutations are durable before the call returns. `transition` applies
/// the forward-transition check atomically, which doubles as the guard
/// against two concurrent processing attempts on the same event.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persists a new event in `received` status.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Validation` if required fields are missing and
    /// `BridgeError::Storage` on persistence failure.
    async fn create(&self, event: &BridgeEvent) -> Result<(), BridgeError>;

    /// Fetches an event by id.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::EventNotFound` if the id is unknown.
    async fn get(&self, id: Uuid) -> Result<BridgeEvent, BridgeError>;

    /// Lists events matching `filter`, ordered by `received_at` descending
    /// (id descending as tie-break), with offset/limit pagination.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Storage` on persistence failure.
    async fn list(&self, filter: &EventFilter) -> Result<Vec<BridgeEvent>, BridgeError>;

    /// Records the evaluated risk for an event without touching its
    /// status, so the level is visible while the event is still
    /// `processing`.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::EventNotFound` if the id is unknown and
    /// `BridgeError::Storage` on persistence failure.
    async fn record_risk(&self, id: Uuid, risk: RiskLevel) -> Result<(), BridgeError>;

    /// Atomically transitions an event's status.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::EventNotFound` if the id is unknown and
    /// `BridgeError::InvalidTransition` if the event's current status is
    /// not a legal predecessor of the target.
    async fn transition(&self, id: Uuid, update: StatusUpdate) -> Result<(), BridgeError>;

    /// Aggregate counts for events received since `since`.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Storage` on persistence failure.
    async fn metrics(&self, since: DateTime<Utc>) -> Result<EventMetrics, BridgeError>;
}
