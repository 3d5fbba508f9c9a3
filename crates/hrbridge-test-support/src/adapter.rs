//! Sync adapter mocks.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use hrbridge_core::event::BridgeEvent;
use hrbridge_core::sync::{SyncAdapter, SyncResult};

/// An adapter that always returns the configured outcome.
#[derive(Debug)]
pub struct StaticSyncAdapter {
    name: &'static str,
    success: bool,
    detail: &'static str,
}

impl StaticSyncAdapter {
    /// An adapter that always succeeds.
    #[must_use]
    pub fn succeeding(name: &'static str) -> Self {
        Self {
            name,
            success: true,
            detail: "synced",
        }
    }

    /// An adapter that always fails.
    #[must_use]
    pub fn failing(name: &'static str) -> Self {
        Self {
            name,
            success: false,
            detail: "downstream unavailable",
        }
    }
}

#[async_trait]
impl SyncAdapter for StaticSyncAdapter {
    fn name(&self) -> &str {
        self.name
    }

    async fn sync(&self, _event: &BridgeEvent) -> SyncResult {
        SyncResult {
            success: self.success,
            detail: self.detail.to_owned(),
        }
    }
}

/// An adapter that records the id of every event it is asked to sync.
#[derive(Debug, Default)]
pub struct RecordingSyncAdapter {
    synced: Mutex<Vec<Uuid>>,
}

impl RecordingSyncAdapter {
    /// Creates a new recording adapter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the event ids synced so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn synced(&self) -> Vec<Uuid> {
        self.synced.lock().unwrap().clone()
    }
}

#[async_trait]
impl SyncAdapter for RecordingSyncAdapter {
    fn name(&self) -> &str {
        "recording"
    }

    async fn sync(&self, event: &BridgeEvent) -> SyncResult {
        self.synced.lock().unwrap().push(event.id);
        SyncResult::ok("recorded")
    }
}

/// An adapter that sleeps before succeeding, for timeout tests.
#[derive(Debug)]
pub struct SlowSyncAdapter {
    delay: Duration,
}

impl SlowSyncAdapter {
    /// An adapter that takes `delay` to respond.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl SyncAdapter for SlowSyncAdapter {
    fn name(&self) -> &str {
        "slow"
    }

    async fn sync(&self, _event: &BridgeEvent) -> SyncResult {
        tokio::time::sleep(self.delay).await;
        SyncResult::ok("finally synced")
    }
}
