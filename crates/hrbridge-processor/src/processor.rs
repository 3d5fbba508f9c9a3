//! The per-event processing state machine.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use hrbridge_core::case::CaseClient;
use hrbridge_core::clock::Clock;
use hrbridge_core::error::BridgeError;
use hrbridge_core::event::{BridgeEvent, EventStatus, RiskLevel};
use hrbridge_core::risk::RiskPolicy;
use hrbridge_core::store::{EventStore, StatusUpdate};
use hrbridge_core::sync::{SyncAdapter, SyncResult};

/// Tuning knobs for the processor, injected at construction time.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Upper bound on a single sync adapter call; a timed-out call is
    /// recorded as a failed adapter result.
    pub adapter_timeout: Duration,
    /// Upper bound on the case-system callback.
    pub callback_timeout: Duration,
    /// Whether a failed high-risk callback fails the whole event. When
    /// false (the default), the failure is recorded in the event's error
    /// detail while the event still completes.
    pub fail_event_on_callback_error: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            adapter_timeout: Duration::from_secs(10),
            callback_timeout: Duration::from_secs(10),
            fail_event_on_callback_error: false,
        }
    }
}

/// Orchestrates evaluation, synchronization, and the case-system callback
/// for one event at a time.
///
/// All status changes go through the store's atomic transition, so two
/// concurrent attempts on the same event cannot both get past the claim.
pub struct EventProcessor {
    store: Arc<dyn EventStore>,
    case_client: Arc<dyn CaseClient>,
    adapters: Vec<Arc<dyn SyncAdapter>>,
    policy: RiskPolicy,
    clock: Arc<dyn Clock>,
    config: ProcessorConfig,
}

impl EventProcessor {
    /// Creates a processor over the given collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn EventStore>,
        case_client: Arc<dyn CaseClient>,
        adapters: Vec<Arc<dyn SyncAdapter>>,
        policy: RiskPolicy,
        clock: Arc<dyn Clock>,
        config: ProcessorConfig,
    ) -> Self {
        Self {
            store,
            case_client,
            adapters,
            policy,
            clock,
            config,
        }
    }

    /// Processes a freshly admitted event: claims it into `processing` and
    /// runs the pipeline. Re-entry on an already completed event is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::EventNotFound` for unknown ids,
    /// `BridgeError::InvalidTransition` when another attempt holds the
    /// claim, and `BridgeError::Storage` when persistence fails; storage
    /// failures after the claim also move the event to `failed`.
    #[instrument(skip(self), fields(event_id = %id))]
    pub async fn process(&self, id: Uuid) -> Result<(), BridgeError> {
        let event = self.store.get(id).await?;
        if event.status == EventStatus::Completed {
            info!("event already completed, nothing to do");
            return Ok(());
        }

        self.store.transition(id, StatusUpdate::processing()).await?;
        self.run_claimed(event).await
    }

    /// Claims a failed event for reprocessing, synchronously. The caller
    /// then schedules `resume` for the actual pipeline run.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::EventNotFound` for unknown ids,
    /// `BridgeError::InvalidState` when the event has not failed, and
    /// `BridgeError::InvalidTransition` when a concurrent reprocess won
    /// the claim first.
    #[instrument(skip(self), fields(event_id = %id))]
    pub async fn claim_for_reprocess(&self, id: Uuid) -> Result<(), BridgeError> {
        let event = self.store.get(id).await?;
        if event.status != EventStatus::Failed {
            return Err(BridgeError::InvalidState {
                id,
                status: event.status,
            });
        }

        self.store.transition(id, StatusUpdate::processing()).await?;
        info!("claimed failed event for reprocessing");
        Ok(())
    }

    /// Runs the pipeline for an event previously claimed with
    /// `claim_for_reprocess`.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::EventNotFound` for unknown ids and
    /// `BridgeError::Storage` when persistence fails mid-pipeline.
    #[instrument(skip(self), fields(event_id = %id))]
    pub async fn resume(&self, id: Uuid) -> Result<(), BridgeError> {
        let event = self.store.get(id).await?;
        self.run_claimed(event).await
    }

    /// Runs evaluation and the remaining pipeline steps for an event
    /// already in `processing`. Payload and identity come from the loaded
    /// event; only the outcome columns change.
    async fn run_claimed(&self, event: BridgeEvent) -> Result<(), BridgeError> {
        let id = event.id;
        let risk = self.policy.evaluate(&event.payload);
        info!(event_id = %id, risk = %risk, "risk evaluation complete");

        // Persist the evaluation before the slower sync steps so the level
        // is visible while the event is still processing and survives a
        // mid-pipeline failure.
        if let Err(err) = self.store.record_risk(id, risk).await {
            self.mark_failed(id, Some(risk), &err).await;
            return Err(err);
        }

        match self.run_pipeline(&event, risk).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.mark_failed(id, Some(risk), &err).await;
                Err(err)
            }
        }
    }

    async fn run_pipeline(&self, event: &BridgeEvent, risk: RiskLevel) -> Result<(), BridgeError> {
        let outcomes = self.run_adapters(event).await;

        let mut error_detail = None;
        if risk == RiskLevel::High {
            if let Err(err) = self.notify_case_system(event, &outcomes).await {
                let detail = format!("case system callback failed: {err}");
                if self.config.fail_event_on_callback_error {
                    self.store
                        .transition(
                            event.id,
                            StatusUpdate::failed(Some(risk), detail, self.clock.now()),
                        )
                        .await?;
                    warn!(event_id = %event.id, error = %err, "high-risk callback failed, event marked failed");
                    return Ok(());
                }
                warn!(event_id = %event.id, error = %err, "high-risk callback failed, completing anyway");
                error_detail = Some(detail);
            }
        }

        self.store
            .transition(
                event.id,
                StatusUpdate::completed(risk, error_detail, self.clock.now()),
            )
            .await?;
        info!(event_id = %event.id, "event completed");
        Ok(())
    }

    /// Invokes every configured adapter, isolating failures: a failed or
    /// timed-out adapter is recorded and the remaining adapters still run.
    async fn run_adapters(&self, event: &BridgeEvent) -> Vec<(String, SyncResult)> {
        let mut outcomes = Vec::with_capacity(self.adapters.len());
        for adapter in &self.adapters {
            let name = adapter.name().to_owned();
            let result = match timeout(self.config.adapter_timeout, adapter.sync(event)).await {
                Ok(result) => result,
                Err(_) => SyncResult::failed(format!(
                    "timed out after {:?}",
                    self.config.adapter_timeout
                )),
            };

            if result.success {
                info!(event_id = %event.id, adapter = %name, detail = %result.detail, "adapter synced");
            } else {
                warn!(event_id = %event.id, adapter = %name, detail = %result.detail, "adapter failed");
            }
            outcomes.push((name, result));
        }
        outcomes
    }

    async fn notify_case_system(
        &self,
        event: &BridgeEvent,
        outcomes: &[(String, SyncResult)],
    ) -> Result<(), BridgeError> {
        let note = callback_note(event, outcomes);
        match timeout(
            self.config.callback_timeout,
            self.case_client.add_case_note(&event.case_id, &note),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(BridgeError::Upstream(format!(
                "callback timed out after {:?}",
                self.config.callback_timeout
            ))),
        }
    }

    /// Best-effort move to `failed` after an unrecoverable pipeline error,
    /// keeping the evaluated risk when one exists.
    async fn mark_failed(&self, id: Uuid, risk: Option<RiskLevel>, err: &BridgeError) {
        let update = StatusUpdate::failed(risk, err.to_string(), self.clock.now());
        if let Err(mark_err) = self.store.transition(id, update).await {
            error!(event_id = %id, error = %mark_err, "could not mark event failed");
        }
    }
}

/// The note appended to the case for high-risk events, summarizing the
/// event and the per-adapter sync outcomes.
fn callback_note(event: &BridgeEvent, outcomes: &[(String, SyncResult)]) -> String {
    let summary = if outcomes.is_empty() {
        "none".to_owned()
    } else {
        outcomes
            .iter()
            .map(|(name, result)| {
                if result.success {
                    format!("{name}=ok")
                } else {
                    format!("{name}=failed ({})", result.detail)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "HIGH RISK: employee {} {} requires additional approval. Sync: {summary}",
        event.employee_id,
        event.event_type()
    )
}
