//! The event model: the unit of work flowing through the bridge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BridgeError;

/// The supported HR lifecycle event kinds. Webhook payloads carrying any
/// other kind are rejected at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    DepartmentChange,
    EmployeeOnboarding,
    EmployeeOffboarding,
    RoleChange,
}

impl EventType {
    /// Returns the wire name of this event type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DepartmentChange => "department_change",
            Self::EmployeeOnboarding => "employee_onboarding",
            Self::EmployeeOffboarding => "employee_offboarding",
            Self::RoleChange => "role_change",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventType {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "department_change" => Ok(Self::DepartmentChange),
            "employee_onboarding" => Ok(Self::EmployeeOnboarding),
            "employee_offboarding" => Ok(Self::EmployeeOffboarding),
            "role_change" => Ok(Self::RoleChange),
            other => Err(BridgeError::Validation(format!(
                "unsupported event type: {other}"
            ))),
        }
    }
}

/// Lifecycle state of a stored event.
///
/// The status only moves forward: `received -> processing -> completed` or
/// `received -> processing -> failed`. A failed event may re-enter
/// `processing` through an explicit reprocess request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Received,
    Processing,
    Completed,
    Failed,
}

impl EventStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Received,
        Self::Processing,
        Self::Completed,
        Self::Failed,
    ];

    /// Returns the wire name of this status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether the forward-transition graph permits moving from `self` to
    /// `to`. This check doubles as the concurrency guard: stores apply it
    /// atomically so two competing attempts cannot both claim an event.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Received | Self::Failed, Self::Processing)
                | (Self::Processing, Self::Completed | Self::Failed)
        )
    }

    /// The statuses from which `to` may legally be entered.
    #[must_use]
    pub fn predecessors(to: Self) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|from| from.can_transition_to(to))
            .collect()
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventStatus {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "received" => Ok(Self::Received),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(BridgeError::Validation(format!(
                "unknown event status: {other}"
            ))),
        }
    }
}

/// Risk classification assigned by the evaluator. Ordered so that
/// escalation can use `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Returns the wire name of this risk level.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(BridgeError::Validation(format!(
                "unknown risk level: {other}"
            ))),
        }
    }
}

/// Event-specific payload, keyed by the `event` tag of the webhook body.
///
/// Each variant carries its own required-field set; unknown tags and
/// missing required fields fail deserialization and are surfaced to the
/// webhook caller as validation errors. Extra fields are ignored, so the
/// stored payload is exactly what the bridge acts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum EventPayload {
    DepartmentChange {
        old_department: String,
        new_department: String,
        #[serde(default)]
        has_financial_access: bool,
        #[serde(default)]
        has_admin_rights: bool,
        #[serde(default)]
        access_to_sensitive_data: bool,
    },
    EmployeeOnboarding {
        department: String,
        #[serde(default)]
        start_date: Option<String>,
    },
    EmployeeOffboarding {
        #[serde(default)]
        department: Option<String>,
        #[serde(default)]
        last_working_day: Option<String>,
    },
    RoleChange {
        old_role: String,
        new_role: String,
        #[serde(default)]
        has_financial_access: bool,
        #[serde(default)]
        has_admin_rights: bool,
        #[serde(default)]
        access_to_sensitive_data: bool,
    },
}

impl EventPayload {
    /// The event type this payload belongs to.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        match self {
            Self::DepartmentChange { .. } => EventType::DepartmentChange,
            Self::EmployeeOnboarding { .. } => EventType::EmployeeOnboarding,
            Self::EmployeeOffboarding { .. } => EventType::EmployeeOffboarding,
            Self::RoleChange { .. } => EventType::RoleChange,
        }
    }
}

/// A single admitted webhook event and its processing outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeEvent {
    /// Unique identifier, assigned at intake and immutable thereafter.
    pub id: Uuid,
    /// External case-system reference.
    pub case_id: String,
    /// Identifier of the affected person.
    pub employee_id: String,
    /// Event-specific fields, stored verbatim.
    pub payload: EventPayload,
    /// Lifecycle state.
    pub status: EventStatus,
    /// Classification set by the evaluator; overwritten on reprocess.
    pub risk_level: Option<RiskLevel>,
    /// When the event was admitted.
    pub received_at: DateTime<Utc>,
    /// When processing last finished (completed or failed).
    pub processed_at: Option<DateTime<Utc>>,
    /// Failure description, populated when `status` is `failed` or when a
    /// non-fatal callback failure was recorded.
    pub error_detail: Option<String>,
}

impl BridgeEvent {
    /// Builds a freshly admitted event in `received` state.
    #[must_use]
    pub fn admit(
        id: Uuid,
        case_id: String,
        employee_id: String,
        payload: EventPayload,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            case_id,
            employee_id,
            payload,
            status: EventStatus::Received,
            risk_level: None,
            received_at,
            processed_at: None,
            error_detail: None,
        }
    }

    /// The event type, derived from the payload variant.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }

    /// Checks the required intake fields.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Validation` if `case_id` or `employee_id` is
    /// empty.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.case_id.trim().is_empty() {
            return Err(BridgeError::Validation(
                "field 'caseId' is required".into(),
            ));
        }
        if self.employee_id.trim().is_empty() {
            return Err(BridgeError::Validation(
                "field 'employeeId' is required".into(),
            ));
        }
        Ok(())
    }
}
