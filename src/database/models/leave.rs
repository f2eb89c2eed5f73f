use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum LeaveType {
        Casual => "casual",
        Sick => "sick",
        Earned => "earned",
        Maternity => "maternity",
        Paternity => "paternity",
        Compensatory => "compensatory",
        Unpaid => "unpaid",
    }
}

impl LeaveType {
    /// Unpaid leave has no ledger entry and is exempt from balance checks.
    pub fn uses_balance(&self) -> bool {
        !matches!(self, LeaveType::Unpaid)
    }

    /// Types whose unused days move into the next year, up to a cap.
    pub fn carries_forward(&self) -> bool {
        matches!(self, LeaveType::Casual | LeaveType::Earned)
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum LeaveStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        AutoRejected => "auto_rejected",
        Cancelled => "cancelled",
    }
}

impl LeaveStatus {
    /// Terminal states accept no further transition; Approved is the single
    /// non-terminal decided state (it may still be cancelled by the owner).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LeaveStatus::Rejected | LeaveStatus::AutoRejected | LeaveStatus::Cancelled
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub number_of_days: i64,
    pub reason: String,
    pub status: LeaveStatus,
    pub rejection_reason: Option<String>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestInput {
    pub employee_id: Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

/// Summary of an existing request that blocks a new application.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveConflict {
    pub id: Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
}

impl From<&LeaveRequest> for LeaveConflict {
    fn from(request: &LeaveRequest) -> Self {
        LeaveConflict {
            id: request.id,
            leave_type: request.leave_type,
            start_date: request.start_date,
            end_date: request.end_date,
            status: request.status,
        }
    }
}

/// One row per status transition, append-only. `from_status` is empty for
/// the creation event; `actor_id` is empty for system transitions.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestEvent {
    pub id: i64,
    pub leave_request_id: Uuid,
    pub from_status: Option<LeaveStatus>,
    pub to_status: LeaveStatus,
    pub actor_id: Option<Uuid>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unpaid_is_exempt_from_balance_checks() {
        assert!(!LeaveType::Unpaid.uses_balance());
        assert!(LeaveType::Casual.uses_balance());
        assert!(LeaveType::Maternity.uses_balance());
    }

    #[test]
    fn only_casual_and_earned_carry_forward() {
        assert!(LeaveType::Casual.carries_forward());
        assert!(LeaveType::Earned.carries_forward());
        assert!(!LeaveType::Sick.carries_forward());
        assert!(!LeaveType::Compensatory.carries_forward());
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            LeaveStatus::Pending,
            LeaveStatus::Approved,
            LeaveStatus::Rejected,
            LeaveStatus::AutoRejected,
            LeaveStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<LeaveStatus>(), Ok(status));
        }
    }

    #[test]
    fn approved_is_not_terminal() {
        assert!(!LeaveStatus::Pending.is_terminal());
        assert!(!LeaveStatus::Approved.is_terminal());
        assert!(LeaveStatus::AutoRejected.is_terminal());
    }
}
