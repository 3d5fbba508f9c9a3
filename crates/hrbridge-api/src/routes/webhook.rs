//! The intake handler: validates and admits incoming webhook events.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};
use uuid::Uuid;

use hrbridge_core::error::BridgeError;
use hrbridge_core::event::{BridgeEvent, EventPayload, EventStatus};
use hrbridge_processor::Job;

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for an admitted event.
#[derive(Debug, Serialize)]
pub struct WebhookAccepted {
    /// The id assigned to the event.
    pub id: Uuid,
    /// Always `received`: processing happens in the background.
    pub status: EventStatus,
}

/// Builds an admitted event from the raw webhook body: requires non-empty
/// `caseId` and `employeeId`, and a payload decodable for one of the
/// supported `event` kinds.
fn parse_webhook(body: &Value, received_at: DateTime<Utc>) -> Result<BridgeEvent, BridgeError> {
    let case_id = required_string(body, "caseId")?;
    let employee_id = required_string(body, "employeeId")?;
    let payload: EventPayload = serde_json::from_value(body.clone())
        .map_err(|err| BridgeError::Validation(format!("invalid event payload: {err}")))?;

    Ok(BridgeEvent::admit(
        Uuid::new_v4(),
        case_id,
        employee_id,
        payload,
        received_at,
    ))
}

fn required_string(body: &Value, field: &'static str) -> Result<String, BridgeError> {
    match body.get(field) {
        Some(Value::String(value)) if !value.trim().is_empty() => Ok(value.clone()),
        None | Some(Value::Null) => Err(BridgeError::Validation(format!(
            "field '{field}' is required"
        ))),
        Some(_) => Err(BridgeError::Validation(format!(
            "field '{field}' must be a non-empty string"
        ))),
    }
}

/// POST /webhook/pega
///
/// Persists the event with status `received` and schedules background
/// processing; never waits on downstream adapters or the case system.
#[instrument(skip(state, body))]
async fn receive_webhook(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<WebhookAccepted>), ApiError> {
    let event = parse_webhook(&body, state.clock.now())?;
    state.store.create(&event).await?;
    state.jobs.enqueue(Job::Process(event.id))?;

    info!(
        event_id = %event.id,
        case_id = %event.case_id,
        event_type = %event.event_type(),
        "admitted webhook event"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(WebhookAccepted {
            id: event.id,
            status: EventStatus::Received,
        }),
    ))
}

/// Returns the webhook router.
pub fn router() -> Router<AppState> {
    Router::new().route("/webhook/pega", post(receive_webhook))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        chrono::TimeZone::with_ymd_and_hms(&Utc, 2026, 8, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_webhook_builds_received_event() {
        let body = json!({
            "caseId": "HRSR-WORK-12345",
            "event": "department_change",
            "employeeId": "EMP001",
            "oldDepartment": "IT",
            "newDepartment": "Finance"
        });

        let event = parse_webhook(&body, now()).unwrap();
        assert_eq!(event.case_id, "HRSR-WORK-12345");
        assert_eq!(event.employee_id, "EMP001");
        assert_eq!(event.status, EventStatus::Received);
        assert_eq!(event.received_at, now());
        assert!(matches!(
            event.payload,
            EventPayload::DepartmentChange { .. }
        ));
    }

    #[test]
    fn test_parse_webhook_rejects_missing_employee_id() {
        let body = json!({
            "caseId": "HRSR-WORK-12345",
            "event": "department_change",
            "oldDepartment": "IT",
            "newDepartment": "Finance"
        });

        match parse_webhook(&body, now()) {
            Err(BridgeError::Validation(msg)) => assert!(msg.contains("employeeId")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_webhook_rejects_blank_case_id() {
        let body = json!({
            "caseId": "  ",
            "event": "role_change",
            "employeeId": "EMP001",
            "oldRole": "Analyst",
            "newRole": "Lead"
        });

        assert!(matches!(
            parse_webhook(&body, now()),
            Err(BridgeError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_webhook_rejects_unsupported_event_kind() {
        let body = json!({
            "caseId": "HRSR-WORK-12345",
            "event": "approval_request",
            "employeeId": "EMP001"
        });

        match parse_webhook(&body, now()) {
            Err(BridgeError::Validation(msg)) => assert!(msg.contains("invalid event payload")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_webhook_rejects_non_string_identifiers() {
        let body = json!({
            "caseId": 12345,
            "event": "employee_onboarding",
            "employeeId": "EMP001",
            "department": "Sales"
        });

        match parse_webhook(&body, now()) {
            Err(BridgeError::Validation(msg)) => assert!(msg.contains("caseId")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
