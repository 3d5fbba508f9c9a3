//! HR Bridge Processor — the asynchronous event processing pipeline.
//!
//! The processor drives one event at a time through risk evaluation,
//! downstream synchronization, and the case-system callback, recording the
//! outcome in the event store. The job queue hands intake off to background
//! tasks so the webhook caller never waits on downstream latency.

pub mod adapters;
pub mod processor;
pub mod queue;

pub use adapters::{BadgeAccessAdapter, EmployeeDirectoryAdapter, NotificationAdapter};
pub use processor::{EventProcessor, ProcessorConfig};
pub use queue::{Job, JobQueue};
