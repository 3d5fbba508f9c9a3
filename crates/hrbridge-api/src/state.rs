//! Shared application state.

use std::sync::Arc;

use hrbridge_core::case::CaseClient;
use hrbridge_core::clock::Clock;
use hrbridge_core::store::EventStore;
use hrbridge_processor::{EventProcessor, JobQueue};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The durable event store.
    pub store: Arc<dyn EventStore>,
    /// Outbound case-system client, used by the passthrough routes.
    pub case_client: Arc<dyn CaseClient>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// The processor, used for synchronous reprocess claims.
    pub processor: Arc<EventProcessor>,
    /// Background job queue.
    pub jobs: JobQueue,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        store: Arc<dyn EventStore>,
        case_client: Arc<dyn CaseClient>,
        clock: Arc<dyn Clock>,
        processor: Arc<EventProcessor>,
        jobs: JobQueue,
    ) -> Self {
        Self {
            store,
            case_client,
            clock,
            processor,
            jobs,
        }
    }
}
