use anyhow::{Result, anyhow};
use chrono::{Datelike, NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::config::LeavePolicy;
use crate::database::models::{LeaveBalance, LeaveType, RolloverValues};

#[derive(Clone)]
pub struct LeaveBalanceRepository {
    pool: SqlitePool,
}

impl LeaveBalanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Column holding the current counter for a leave type; `None` for
    /// unpaid leave, which has no ledger entry.
    fn current_column(leave_type: LeaveType) -> Option<&'static str> {
        match leave_type {
            LeaveType::Casual => Some("casual_current"),
            LeaveType::Sick => Some("sick_current"),
            LeaveType::Earned => Some("earned_current"),
            LeaveType::Maternity => Some("maternity_current"),
            LeaveType::Paternity => Some("paternity_current"),
            LeaveType::Compensatory => Some("compensatory_current"),
            LeaveType::Unpaid => None,
        }
    }

    /// Create the opening balance row for a newly onboarded employee, inside
    /// the onboarding transaction.
    pub async fn insert_default(
        tx: &mut Transaction<'_, Sqlite>,
        employee_id: Uuid,
        policy: &LeavePolicy,
    ) -> Result<()> {
        let now = Utc::now();
        let reset_date = NaiveDate::from_ymd_opt(now.year(), 1, 1)
            .ok_or_else(|| anyhow!("invalid reset year: {}", now.year()))?;

        sqlx::query(
            r#"
            INSERT INTO
                leave_balances (
                    employee_id,
                    casual_current,
                    casual_carried,
                    casual_max_carry,
                    sick_current,
                    earned_current,
                    earned_carried,
                    earned_max_carry,
                    maternity_current,
                    paternity_current,
                    compensatory_current,
                    last_reset_date,
                    updated_at
                )
            VALUES
                (?, ?, 0, ?, ?, ?, 0, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(employee_id)
        .bind(policy.casual_quota)
        .bind(policy.casual_max_carry)
        .bind(policy.sick_quota)
        .bind(policy.earned_quota)
        .bind(policy.earned_max_carry)
        .bind(policy.maternity_quota)
        .bind(policy.paternity_quota)
        .bind(policy.compensatory_quota)
        .bind(reset_date)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Get the balance row for an employee
    pub async fn get(&self, employee_id: Uuid) -> Result<Option<LeaveBalance>> {
        let balance = sqlx::query_as::<_, LeaveBalance>(
            r#"
            SELECT
                employee_id,
                casual_current,
                casual_carried,
                casual_max_carry,
                sick_current,
                earned_current,
                earned_carried,
                earned_max_carry,
                maternity_current,
                paternity_current,
                compensatory_current,
                last_reset_date,
                updated_at
            FROM
                leave_balances
            WHERE
                employee_id = ?
            "#,
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(balance)
    }

    pub async fn list_all(&self) -> Result<Vec<LeaveBalance>> {
        let balances = sqlx::query_as::<_, LeaveBalance>(
            r#"
            SELECT
                employee_id,
                casual_current,
                casual_carried,
                casual_max_carry,
                sick_current,
                earned_current,
                earned_carried,
                earned_max_carry,
                maternity_current,
                paternity_current,
                compensatory_current,
                last_reset_date,
                updated_at
            FROM
                leave_balances
            ORDER BY
                employee_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(balances)
    }

    /// Guarded decrement inside the caller's transaction: the update requires
    /// the counter to cover `days` and clamps at zero. Returns false when the
    /// balance no longer covers the request. Unpaid leave is a no-op success.
    pub async fn deduct(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        employee_id: Uuid,
        leave_type: LeaveType,
        days: i64,
    ) -> Result<bool> {
        let Some(column) = Self::current_column(leave_type) else {
            return Ok(true);
        };

        let query = format!(
            r#"
            UPDATE leave_balances
            SET
                {0} = MAX({0} - ?, 0),
                updated_at = ?
            WHERE
                employee_id = ?
                AND {0} >= ?
            "#,
            column
        );

        let result = sqlx::query(&query)
            .bind(days)
            .bind(Utc::now())
            .bind(employee_id)
            .bind(days)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Return days to a counter after an approved request is cancelled. No
    /// upper cap. Unpaid leave is a no-op.
    pub async fn refund(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        employee_id: Uuid,
        leave_type: LeaveType,
        days: i64,
    ) -> Result<()> {
        let Some(column) = Self::current_column(leave_type) else {
            return Ok(());
        };

        let query = format!(
            r#"
            UPDATE leave_balances
            SET
                {0} = {0} + ?,
                updated_at = ?
            WHERE
                employee_id = ?
            "#,
            column
        );

        sqlx::query(&query)
            .bind(days)
            .bind(Utc::now())
            .bind(employee_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Write the year-end counters, guarded on the reset date the sweep
    /// observed. Returns false when another run already reset this row.
    pub async fn apply_rollover(
        &self,
        employee_id: Uuid,
        rolled: &RolloverValues,
        observed_reset_date: NaiveDate,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE leave_balances
            SET
                casual_current = ?,
                casual_carried = ?,
                earned_current = ?,
                earned_carried = ?,
                sick_current = ?,
                last_reset_date = ?,
                updated_at = ?
            WHERE
                employee_id = ?
                AND last_reset_date = ?
            "#,
        )
        .bind(rolled.casual_current)
        .bind(rolled.casual_carried)
        .bind(rolled.earned_current)
        .bind(rolled.earned_carried)
        .bind(rolled.sick_current)
        .bind(rolled.reset_date)
        .bind(Utc::now())
        .bind(employee_id)
        .bind(observed_reset_date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
