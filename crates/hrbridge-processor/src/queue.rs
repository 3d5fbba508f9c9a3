//! In-process job queue for background event processing.
//!
//! Intake hands an event id to the queue and returns immediately; the
//! dispatcher spawns one task per job, so distinct events process
//! concurrently while a single event's steps stay sequential inside its
//! task.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::error;
use uuid::Uuid;

use hrbridge_core::error::BridgeError;

use crate::processor::EventProcessor;

/// A unit of background work.
#[derive(Debug, Clone, Copy)]
pub enum Job {
    /// A newly admitted event, still in `received`.
    Process(Uuid),
    /// An event already claimed into `processing` by a reprocess request.
    Resume(Uuid),
}

impl Job {
    fn event_id(self) -> Uuid {
        match self {
            Self::Process(id) | Self::Resume(id) => id,
        }
    }
}

/// Handle for enqueuing background jobs.
#[derive(Debug, Clone)]
pub struct JobQueue {
    tx: mpsc::UnboundedSender<Job>,
}

impl JobQueue {
    /// Starts the dispatcher task over the given processor and returns the
    /// enqueue handle.
    #[must_use]
    pub fn start(processor: Arc<EventProcessor>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let processor = Arc::clone(&processor);
                tokio::spawn(async move {
                    let result = match job {
                        Job::Process(id) => processor.process(id).await,
                        Job::Resume(id) => processor.resume(id).await,
                    };
                    if let Err(err) = result {
                        error!(event_id = %job.event_id(), error = %err, "background processing failed");
                    }
                });
            }
        });

        Self { tx }
    }

    /// Schedules a job. Never blocks the caller.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Storage` if the dispatcher has shut down.
    pub fn enqueue(&self, job: Job) -> Result<(), BridgeError> {
        self.tx
            .send(job)
            .map_err(|_| BridgeError::Storage("background job queue is closed".into()))
    }
}
