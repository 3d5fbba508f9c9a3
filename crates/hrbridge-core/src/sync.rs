//! Sync adapter seam for downstream system integrations.

use async_trait::async_trait;

use crate::event::BridgeEvent;

/// Outcome of a single adapter invocation.
///
/// Adapters report failure through `success = false` rather than an error
/// type: a failed adapter is recorded and isolated, it neither aborts the
/// remaining adapters nor fails the event by itself.
#[derive(Debug, Clone)]
pub struct SyncResult {
    /// Whether the downstream propagation succeeded.
    pub success: bool,
    /// Human-readable description of what the adapter did or why it failed.
    pub detail: String,
}

impl SyncResult {
    /// A successful outcome with the given detail.
    #[must_use]
    pub fn ok(detail: impl Into<String>) -> Self {
        Self {
            success: true,
            detail: detail.into(),
        }
    }

    /// A failed outcome with the given detail.
    #[must_use]
    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: detail.into(),
        }
    }
}

/// A pluggable integration point propagating an event's effects to an
/// external system (badge management, directories, notification channels).
#[async_trait]
pub trait SyncAdapter: Send + Sync {
    /// Stable name of the downstream system, used in logs and callbacks.
    fn name(&self) -> &str;

    /// Propagates the event to the downstream system.
    async fn sync(&self, event: &BridgeEvent) -> SyncResult;
}
