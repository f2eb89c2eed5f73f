use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::LeavePolicy;
use crate::database::models::LeaveType;

/// Per-employee entitlement counters, one row per employee. Unpaid leave has
/// no counter here.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalance {
    pub employee_id: Uuid,
    pub casual_current: i64,
    pub casual_carried: i64,
    pub casual_max_carry: i64,
    pub sick_current: i64,
    pub earned_current: i64,
    pub earned_carried: i64,
    pub earned_max_carry: i64,
    pub maternity_current: i64,
    pub paternity_current: i64,
    pub compensatory_current: i64,
    pub last_reset_date: NaiveDate,
    pub updated_at: DateTime<Utc>,
}

impl LeaveBalance {
    /// Remaining days for a balance-backed type; `None` for unpaid leave.
    pub fn available(&self, leave_type: LeaveType) -> Option<i64> {
        match leave_type {
            LeaveType::Casual => Some(self.casual_current),
            LeaveType::Sick => Some(self.sick_current),
            LeaveType::Earned => Some(self.earned_current),
            LeaveType::Maternity => Some(self.maternity_current),
            LeaveType::Paternity => Some(self.paternity_current),
            LeaveType::Compensatory => Some(self.compensatory_current),
            LeaveType::Unpaid => None,
        }
    }

    pub fn has_available(&self, leave_type: LeaveType, days: i64) -> bool {
        match self.available(leave_type) {
            Some(current) => current >= days,
            None => true,
        }
    }

    /// Opening counters for `year`. Carry-eligible types keep
    /// `min(current, cap)` on top of the fresh quota, sick resets flat, and
    /// the granted types (maternity/paternity/compensatory) are untouched.
    /// Returns `None` for a year outside the calendar's range.
    pub fn rollover_values(&self, policy: &LeavePolicy, year: i32) -> Option<RolloverValues> {
        let reset_date = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let casual_carried = self.casual_current.min(self.casual_max_carry);
        let earned_carried = self.earned_current.min(self.earned_max_carry);

        Some(RolloverValues {
            casual_current: policy.casual_quota + casual_carried,
            casual_carried,
            earned_current: policy.earned_quota + earned_carried,
            earned_carried,
            sick_current: policy.sick_quota,
            reset_date,
        })
    }
}

/// Counters written back by the year-end rollover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverValues {
    pub casual_current: i64,
    pub casual_carried: i64,
    pub earned_current: i64,
    pub earned_carried: i64,
    pub sick_current: i64,
    pub reset_date: NaiveDate,
}
