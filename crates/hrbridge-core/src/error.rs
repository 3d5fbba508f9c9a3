//! Domain error taxonomy.

use thiserror::Error;
use uuid::Uuid;

use crate::event::EventStatus;

/// Top-level error type for the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The referenced event does not exist.
    #[error("event not found: {0}")]
    EventNotFound(Uuid),

    /// The referenced case does not exist in the case system.
    #[error("case not found: {0}")]
    CaseNotFound(String),

    /// Malformed or incomplete intake payload.
    #[error("validation error: {0}")]
    Validation(String),

    /// The requested status change violates the forward-transition graph.
    #[error("invalid status transition for event {id}: {from} -> {to}")]
    InvalidTransition {
        /// The event whose transition was rejected.
        id: Uuid,
        /// Its current status.
        from: EventStatus,
        /// The requested status.
        to: EventStatus,
    },

    /// The event is not in a state that permits the requested operation
    /// (for example, reprocessing an event that has not failed).
    #[error("event {id} is {status}, expected failed")]
    InvalidState {
        /// The event in question.
        id: Uuid,
        /// Its current status.
        status: EventStatus,
    },

    /// An outbound case-system call failed.
    #[error("upstream case system error: {0}")]
    Upstream(String),

    /// The persistence layer failed.
    #[error("storage error: {0}")]
    Storage(String),
}
