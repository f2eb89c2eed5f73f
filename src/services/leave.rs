use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{
    LeaveBalance, LeaveConflict, LeaveRequest, LeaveRequestEvent, LeaveRequestInput, LeaveStatus,
};
use crate::database::repositories::{
    EmployeeRepository, LeaveBalanceRepository, LeaveRequestRepository,
};
use crate::error::AppError;
use crate::services::WorkCalendar;

/// Owns the leave request lifecycle: validation, the overlap guard, and the
/// ledger effects tied to each status transition.
#[derive(Clone)]
pub struct LeaveService {
    pool: SqlitePool,
    employees: EmployeeRepository,
    requests: LeaveRequestRepository,
    balances: LeaveBalanceRepository,
    calendar: WorkCalendar,
}

impl LeaveService {
    pub fn new(
        pool: SqlitePool,
        employees: EmployeeRepository,
        requests: LeaveRequestRepository,
        balances: LeaveBalanceRepository,
        calendar: WorkCalendar,
    ) -> Self {
        Self {
            pool,
            employees,
            requests,
            balances,
            calendar,
        }
    }

    /// File a new request. Validates dates against the employee's calendar,
    /// applies the overlap guard, and pre-checks the balance. Nothing is
    /// deducted here; deduction happens at approval.
    pub async fn apply(&self, input: LeaveRequestInput) -> Result<LeaveRequest, AppError> {
        let employee = self
            .employees
            .find_by_id(input.employee_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", input.employee_id)))?;

        if input.start_date > input.end_date {
            return Err(AppError::BadRequest(format!(
                "Invalid date range: start {} is after end {}",
                input.start_date, input.end_date
            )));
        }

        if self
            .calendar
            .is_non_working_day(input.start_date, &employee.country_code)
            .await?
        {
            return Err(AppError::BadRequest(
                "Leave cannot start on a non-working day".to_string(),
            ));
        }
        if self
            .calendar
            .is_non_working_day(input.end_date, &employee.country_code)
            .await?
        {
            return Err(AppError::BadRequest(
                "Leave cannot end on a non-working day".to_string(),
            ));
        }

        let number_of_days = self
            .calendar
            .working_days_between(input.start_date, input.end_date, &employee.country_code)
            .await?;
        if number_of_days == 0 {
            return Err(AppError::BadRequest(
                "Requested range contains no working days".to_string(),
            ));
        }

        let overlapping = self
            .requests
            .find_overlapping(input.employee_id, input.start_date, input.end_date)
            .await?;
        if !overlapping.is_empty() {
            return Err(AppError::Overlap(
                overlapping.iter().map(LeaveConflict::from).collect(),
            ));
        }

        if input.leave_type.uses_balance() {
            let balance = self.balance_of(input.employee_id).await?;
            if !balance.has_available(input.leave_type, number_of_days) {
                return Err(AppError::InsufficientBalance {
                    leave_type: input.leave_type,
                    requested: number_of_days,
                    available: balance.available(input.leave_type).unwrap_or(0),
                });
            }
        }

        Ok(self.requests.create(&input, number_of_days).await?)
    }

    /// Approve a Pending request. The availability re-check, the deduction,
    /// and the status transition commit or roll back as one transaction, so
    /// concurrent approvals cannot jointly over-deduct a balance.
    pub async fn approve(&self, leave_id: Uuid, approver_id: Uuid) -> Result<LeaveRequest, AppError> {
        let request = self.get(leave_id).await?;
        if request.status != LeaveStatus::Pending {
            return Err(AppError::StateConflict(format!(
                "Leave request {} is already {}",
                leave_id, request.status
            )));
        }

        let mut tx = self.pool.begin().await?;

        if request.leave_type.uses_balance() {
            let deducted = self
                .balances
                .deduct(
                    &mut tx,
                    request.employee_id,
                    request.leave_type,
                    request.number_of_days,
                )
                .await?;
            if !deducted {
                tx.rollback().await?;
                let balance = self.balance_of(request.employee_id).await?;
                return Err(AppError::InsufficientBalance {
                    leave_type: request.leave_type,
                    requested: request.number_of_days,
                    available: balance.available(request.leave_type).unwrap_or(0),
                });
            }
        }

        match self
            .requests
            .approve(&mut tx, leave_id, approver_id, Utc::now())
            .await?
        {
            Some(approved) => {
                tx.commit().await?;
                Ok(approved)
            }
            None => {
                // Lost the race to another transition; the deduction above
                // rolls back with the transaction.
                tx.rollback().await?;
                Err(AppError::StateConflict(format!(
                    "Leave request {} is no longer pending",
                    leave_id
                )))
            }
        }
    }

    /// Reject a Pending request. A reason is mandatory; balances are never
    /// touched because Pending requests were never deducted.
    pub async fn reject(
        &self,
        leave_id: Uuid,
        rejector_id: Uuid,
        reason: &str,
    ) -> Result<LeaveRequest, AppError> {
        if reason.trim().is_empty() {
            return Err(AppError::BadRequest(
                "A rejection reason is required".to_string(),
            ));
        }

        let request = self.get(leave_id).await?;
        if request.status != LeaveStatus::Pending {
            return Err(AppError::StateConflict(format!(
                "Leave request {} is already {}",
                leave_id, request.status
            )));
        }

        match self.requests.reject(leave_id, rejector_id, reason).await? {
            Some(rejected) => Ok(rejected),
            None => Err(AppError::StateConflict(format!(
                "Leave request {} is no longer pending",
                leave_id
            ))),
        }
    }

    /// Cancel a Pending or Approved request, owner only. Cancelling an
    /// Approved request refunds its working days in the same transaction.
    pub async fn cancel(&self, leave_id: Uuid, employee_id: Uuid) -> Result<LeaveRequest, AppError> {
        let request = self.get(leave_id).await?;

        if request.employee_id != employee_id {
            return Err(AppError::Forbidden(
                "Only the requesting employee may cancel a leave request".to_string(),
            ));
        }
        if !matches!(
            request.status,
            LeaveStatus::Pending | LeaveStatus::Approved
        ) {
            return Err(AppError::StateConflict(format!(
                "Leave request {} is already {}",
                leave_id, request.status
            )));
        }

        let mut tx = self.pool.begin().await?;

        let Some(cancelled) = self.requests.cancel(&mut tx, leave_id, request.status).await? else {
            tx.rollback().await?;
            return Err(AppError::StateConflict(format!(
                "Leave request {} changed state during cancellation",
                leave_id
            )));
        };

        if request.status == LeaveStatus::Approved && request.leave_type.uses_balance() {
            self.balances
                .refund(
                    &mut tx,
                    request.employee_id,
                    request.leave_type,
                    request.number_of_days,
                )
                .await?;
        }

        tx.commit().await?;
        Ok(cancelled)
    }

    pub async fn get(&self, leave_id: Uuid) -> Result<LeaveRequest, AppError> {
        self.requests
            .find_by_id(leave_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Leave request {} not found", leave_id)))
    }

    pub async fn list(
        &self,
        employee_id: Option<Uuid>,
        status: Option<LeaveStatus>,
    ) -> Result<Vec<LeaveRequest>, AppError> {
        Ok(self.requests.list(employee_id, status).await?)
    }

    /// Transition history for a request, oldest first.
    pub async fn history(&self, leave_id: Uuid) -> Result<Vec<LeaveRequestEvent>, AppError> {
        self.get(leave_id).await?;
        Ok(self.requests.events_for(leave_id).await?)
    }

    pub async fn balance_of(&self, employee_id: Uuid) -> Result<LeaveBalance, AppError> {
        self.balances.get(employee_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Leave balance for employee {} not found", employee_id))
        })
    }
}
