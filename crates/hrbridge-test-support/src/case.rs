//! Recording mock for the case-system client.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use hrbridge_core::case::CaseClient;
use hrbridge_core::error::BridgeError;

/// A case client that records every call and can be switched into a
/// failing mode to exercise upstream-failure paths.
#[derive(Debug, Default)]
pub struct RecordingCaseClient {
    notes: Mutex<Vec<(String, String)>>,
    actions: Mutex<Vec<(String, String)>>,
    failing: AtomicBool,
}

impl RecordingCaseClient {
    /// Creates a client that succeeds on every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// When `failing` is true, every call returns `BridgeError::Upstream`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of `(case_id, note)` pairs added so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn notes(&self) -> Vec<(String, String)> {
        self.notes.lock().unwrap().clone()
    }

    /// Snapshot of `(case_id, action_id)` pairs executed so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn actions(&self) -> Vec<(String, String)> {
        self.actions.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), BridgeError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(BridgeError::Upstream("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CaseClient for RecordingCaseClient {
    async fn create_case(&self, case_type: &str, _content: &Value) -> Result<Value, BridgeError> {
        self.check()?;
        Ok(json!({ "ID": format!("{case_type} W-001") }))
    }

    async fn update_case(&self, case_id: &str, _content: &Value) -> Result<Value, BridgeError> {
        self.check()?;
        Ok(json!({ "ID": case_id }))
    }

    async fn get_case(&self, case_id: &str) -> Result<Value, BridgeError> {
        self.check()?;
        Ok(json!({ "ID": case_id }))
    }

    async fn add_case_note(&self, case_id: &str, note: &str) -> Result<(), BridgeError> {
        self.check()?;
        self.notes
            .lock()
            .unwrap()
            .push((case_id.to_owned(), note.to_owned()));
        Ok(())
    }

    async fn execute_case_action(
        &self,
        case_id: &str,
        action_id: &str,
        _data: &Value,
    ) -> Result<(), BridgeError> {
        self.check()?;
        self.actions
            .lock()
            .unwrap()
            .push((case_id.to_owned(), action_id.to_owned()));
        Ok(())
    }
}
