//! In-memory `EventStore` for tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use hrbridge_core::error::BridgeError;
use hrbridge_core::event::{BridgeEvent, EventStatus, RiskLevel};
use hrbridge_core::store::{EventFilter, EventMetrics, EventStore, StatusUpdate};

/// In-memory event store with the same compare-and-swap transition
/// semantics as the SQLite implementation. Supports targeted write-fault
/// injection for storage-failure scenarios.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: Mutex<HashMap<Uuid, BridgeEvent>>,
    fail_transitions_to: Mutex<Option<EventStatus>>,
}

impl InMemoryEventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every transition into `target` fail with a storage error
    /// until cleared with `None`. Other operations are unaffected.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn fail_transitions_to(&self, target: Option<EventStatus>) {
        *self.fail_transitions_to.lock().unwrap() = target;
    }

    /// Inserts an event directly, bypassing validation. Useful for seeding
    /// events in non-initial states.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn insert_raw(&self, event: BridgeEvent) {
        self.events.lock().unwrap().insert(event.id, event);
    }

    /// Number of stored events.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Whether the store is empty.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn create(&self, event: &BridgeEvent) -> Result<(), BridgeError> {
        event.validate()?;
        self.events.lock().unwrap().insert(event.id, event.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<BridgeEvent, BridgeError> {
        self.events
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(BridgeError::EventNotFound(id))
    }

    async fn list(&self, filter: &EventFilter) -> Result<Vec<BridgeEvent>, BridgeError> {
        let events = self.events.lock().unwrap();
        let mut matched: Vec<BridgeEvent> = events
            .values()
            .filter(|e| filter.status.is_none_or(|s| e.status == s))
            .filter(|e| filter.event_type.is_none_or(|t| e.event_type() == t))
            .filter(|e| {
                filter
                    .case_id
                    .as_ref()
                    .is_none_or(|case_id| &e.case_id == case_id)
            })
            .filter(|e| filter.received_after.is_none_or(|t| e.received_at >= t))
            .filter(|e| filter.received_before.is_none_or(|t| e.received_at < t))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            b.received_at
                .cmp(&a.received_at)
                .then(b.id.cmp(&a.id))
        });

        let offset = usize::try_from(filter.offset).unwrap_or(0);
        let limit = usize::try_from(filter.limit).unwrap_or(usize::MAX);
        Ok(matched.into_iter().skip(offset).take(limit).collect())
    }

    async fn record_risk(&self, id: Uuid, risk: RiskLevel) -> Result<(), BridgeError> {
        let mut events = self.events.lock().unwrap();
        let event = events.get_mut(&id).ok_or(BridgeError::EventNotFound(id))?;
        event.risk_level = Some(risk);
        Ok(())
    }

    async fn transition(&self, id: Uuid, update: StatusUpdate) -> Result<(), BridgeError> {
        if *self.fail_transitions_to.lock().unwrap() == Some(update.to) {
            return Err(BridgeError::Storage("injected storage failure".into()));
        }

        // Single lock held across check and write: same atomicity as the
        // guarded UPDATE in the SQLite store.
        let mut events = self.events.lock().unwrap();
        let event = events.get_mut(&id).ok_or(BridgeError::EventNotFound(id))?;
        if !event.status.can_transition_to(update.to) {
            return Err(BridgeError::InvalidTransition {
                id,
                from: event.status,
                to: update.to,
            });
        }

        event.status = update.to;
        event.risk_level = update.risk_level;
        event.error_detail = update.error_detail;
        event.processed_at = update.processed_at;
        Ok(())
    }

    async fn metrics(&self, since: DateTime<Utc>) -> Result<EventMetrics, BridgeError> {
        let events = self.events.lock().unwrap();
        let mut by_status = BTreeMap::new();
        let mut by_event_type = BTreeMap::new();
        let mut by_risk_level = BTreeMap::new();
        let mut total = 0;

        for event in events.values().filter(|e| e.received_at >= since) {
            total += 1;
            *by_status.entry(event.status.as_str().to_owned()).or_insert(0) += 1;
            *by_event_type
                .entry(event.event_type().as_str().to_owned())
                .or_insert(0) += 1;
            if let Some(risk) = event.risk_level {
                *by_risk_level.entry(risk.as_str().to_owned()).or_insert(0) += 1;
            }
        }

        Ok(EventMetrics {
            since,
            total,
            by_status,
            by_event_type,
            by_risk_level,
        })
    }
}
