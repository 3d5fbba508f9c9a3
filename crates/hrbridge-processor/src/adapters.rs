//! Built-in sync adapters for the systems the bridge feeds.
//!
//! These mirror the integrations the bridge is deployed with: the employee
//! directory, the badge/access system, and the notification fan-out. Each
//! adapter describes what it did in its result detail so the case-system
//! callback can summarize the sync outcome.

use async_trait::async_trait;
use tracing::info;

use hrbridge_core::event::{BridgeEvent, EventPayload};
use hrbridge_core::sync::{SyncAdapter, SyncResult};

/// Keeps the employee directory in step with HR lifecycle changes.
#[derive(Debug, Default)]
pub struct EmployeeDirectoryAdapter;

#[async_trait]
impl SyncAdapter for EmployeeDirectoryAdapter {
    fn name(&self) -> &str {
        "employee_directory"
    }

    async fn sync(&self, event: &BridgeEvent) -> SyncResult {
        let detail = match &event.payload {
            EventPayload::DepartmentChange { new_department, .. } => format!(
                "moved {} to department {new_department}",
                event.employee_id
            ),
            EventPayload::EmployeeOnboarding { department, .. } => format!(
                "created directory entry for {} in {department}",
                event.employee_id
            ),
            EventPayload::EmployeeOffboarding { .. } => {
                format!("deactivated directory entry for {}", event.employee_id)
            }
            EventPayload::RoleChange { new_role, .. } => {
                format!("updated title for {} to {new_role}", event.employee_id)
            }
        };
        info!(employee_id = %event.employee_id, "{detail}");
        SyncResult::ok(detail)
    }
}

/// Provisions and revokes badge access.
#[derive(Debug, Default)]
pub struct BadgeAccessAdapter;

#[async_trait]
impl SyncAdapter for BadgeAccessAdapter {
    fn name(&self) -> &str {
        "badge_access"
    }

    async fn sync(&self, event: &BridgeEvent) -> SyncResult {
        let detail = match &event.payload {
            EventPayload::DepartmentChange { new_department, .. } => format!(
                "updated badge access of {} for department {new_department}",
                event.employee_id
            ),
            EventPayload::EmployeeOnboarding { .. } => {
                format!("issued badge for {}", event.employee_id)
            }
            EventPayload::EmployeeOffboarding { .. } => {
                format!("revoked badge access for {}", event.employee_id)
            }
            EventPayload::RoleChange { .. } => format!(
                "refreshed role-based access for {}",
                event.employee_id
            ),
        };
        info!(employee_id = %event.employee_id, "{detail}");
        SyncResult::ok(detail)
    }
}

/// Fans the event out to the notification channels (IT, facilities, team).
#[derive(Debug, Default)]
pub struct NotificationAdapter;

#[async_trait]
impl SyncAdapter for NotificationAdapter {
    fn name(&self) -> &str {
        "notifications"
    }

    async fn sync(&self, event: &BridgeEvent) -> SyncResult {
        let detail = match &event.payload {
            EventPayload::DepartmentChange {
                old_department,
                new_department,
                ..
            } => format!(
                "notified {old_department} and {new_department} about the transfer of {}",
                event.employee_id
            ),
            EventPayload::EmployeeOnboarding { department, .. } => format!(
                "scheduled orientation for {} in {department}",
                event.employee_id
            ),
            EventPayload::EmployeeOffboarding {
                last_working_day, ..
            } => format!(
                "notified IT of offboarding of {} (last day: {})",
                event.employee_id,
                last_working_day.as_deref().unwrap_or("unspecified")
            ),
            EventPayload::RoleChange { new_role, .. } => format!(
                "announced role change of {} to {new_role}",
                event.employee_id
            ),
        };
        info!(employee_id = %event.employee_id, "{detail}");
        SyncResult::ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn offboarding() -> BridgeEvent {
        BridgeEvent::admit(
            Uuid::new_v4(),
            "HRSR-WORK-1".into(),
            "EMP001".into(),
            EventPayload::EmployeeOffboarding {
                department: Some("IT".into()),
                last_working_day: Some("2026-09-30".into()),
            },
            Utc.with_ymd_and_hms(2026, 8, 20, 12, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_directory_adapter_deactivates_on_offboarding() {
        let result = EmployeeDirectoryAdapter.sync(&offboarding()).await;
        assert!(result.success);
        assert!(result.detail.contains("deactivated"));
        assert!(result.detail.contains("EMP001"));
    }

    #[tokio::test]
    async fn test_badge_adapter_revokes_on_offboarding() {
        let result = BadgeAccessAdapter.sync(&offboarding()).await;
        assert!(result.success);
        assert!(result.detail.contains("revoked"));
    }

    #[tokio::test]
    async fn test_notification_adapter_includes_last_working_day() {
        let result = NotificationAdapter.sync(&offboarding()).await;
        assert!(result.success);
        assert!(result.detail.contains("2026-09-30"));
    }
}
