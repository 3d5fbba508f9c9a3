//! Risk evaluation: a pure decision function over an event's payload.

use crate::event::{EventPayload, RiskLevel};

/// Rule table mapping an event's type and fields to a risk classification.
///
/// Deterministic and side-effect free: the same payload always yields the
/// same level. New rules extend the table without changing the call
/// contract.
#[derive(Debug, Clone)]
pub struct RiskPolicy {
    sensitive_departments: Vec<String>,
    high_risk_threshold: u8,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            sensitive_departments: ["Finance", "Security", "IT", "Legal"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            high_risk_threshold: 7,
        }
    }
}

impl RiskPolicy {
    /// A policy with a custom set of sensitive departments.
    #[must_use]
    pub fn with_sensitive_departments(departments: Vec<String>) -> Self {
        Self {
            sensitive_departments: departments,
            ..Self::default()
        }
    }

    fn is_sensitive(&self, department: &str) -> bool {
        self.sensitive_departments
            .iter()
            .any(|d| d.eq_ignore_ascii_case(department))
    }

    /// Access-flag score: financial access 3, admin rights 4, sensitive
    /// data 3, capped at 10.
    fn access_score(financial: bool, admin: bool, sensitive_data: bool) -> u8 {
        let mut score = 0;
        if financial {
            score += 3;
        }
        if admin {
            score += 4;
        }
        if sensitive_data {
            score += 3;
        }
        score.min(10)
    }

    /// Classifies the event.
    #[must_use]
    pub fn evaluate(&self, payload: &EventPayload) -> RiskLevel {
        match payload {
            EventPayload::DepartmentChange {
                old_department,
                new_department,
                has_financial_access,
                has_admin_rights,
                access_to_sensitive_data,
            } => {
                if !self.is_sensitive(old_department) && !self.is_sensitive(new_department) {
                    return RiskLevel::Low;
                }
                let score = Self::access_score(
                    *has_financial_access,
                    *has_admin_rights,
                    *access_to_sensitive_data,
                );
                if score > self.high_risk_threshold {
                    RiskLevel::High
                } else {
                    RiskLevel::Medium
                }
            }
            EventPayload::EmployeeOnboarding { department, .. } => {
                if self.is_sensitive(department) {
                    RiskLevel::Medium
                } else {
                    RiskLevel::Low
                }
            }
            // Offboarding always escalates: access must be revoked, and
            // sensitive departments require a case-system callback.
            EventPayload::EmployeeOffboarding { department, .. } => match department {
                Some(dept) if self.is_sensitive(dept) => RiskLevel::High,
                _ => RiskLevel::Medium,
            },
            EventPayload::RoleChange {
                has_financial_access,
                has_admin_rights,
                access_to_sensitive_data,
                ..
            } => {
                let score = Self::access_score(
                    *has_financial_access,
                    *has_admin_rights,
                    *access_to_sensitive_data,
                );
                if score > self.high_risk_threshold {
                    RiskLevel::High
                } else if score > 0 {
                    RiskLevel::Medium
                } else {
                    RiskLevel::Low
                }
            }
        }
    }
}
