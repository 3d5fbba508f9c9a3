//! Outbound case-system client seam.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BridgeError;

/// Client for the external case-management platform.
///
/// The bridge calls this to push updates back: case creation and updates,
/// notes, and case actions. Implementations translate transport failures
/// into `BridgeError::Upstream` and unknown case ids into
/// `BridgeError::CaseNotFound`.
#[async_trait]
pub trait CaseClient: Send + Sync {
    /// Creates a new case of the given type and returns the upstream
    /// response body.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Upstream` on transport or server failure.
    async fn create_case(&self, case_type: &str, content: &Value) -> Result<Value, BridgeError>;

    /// Updates an existing case and returns the upstream response body.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::CaseNotFound` if the case id is unknown and
    /// `BridgeError::Upstream` on other failures.
    async fn update_case(&self, case_id: &str, content: &Value) -> Result<Value, BridgeError>;

    /// Fetches a case.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::CaseNotFound` if the case id is unknown and
    /// `BridgeError::Upstream` on other failures.
    async fn get_case(&self, case_id: &str) -> Result<Value, BridgeError>;

    /// Appends a note to a case.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::CaseNotFound` if the case id is unknown and
    /// `BridgeError::Upstream` on other failures.
    async fn add_case_note(&self, case_id: &str, note: &str) -> Result<(), BridgeError>;

    /// Executes a case action (approve, reject, ...).
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::CaseNotFound` if the case id is unknown and
    /// `BridgeError::Upstream` on other failures.
    async fn execute_case_action(
        &self,
        case_id: &str,
        action_id: &str,
        data: &Value,
    ) -> Result<(), BridgeError>;
}
