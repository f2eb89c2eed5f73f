use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::database::models::{LeaveRequest, LeaveRequestEvent, LeaveRequestInput, LeaveStatus};

#[derive(Clone)]
pub struct LeaveRequestRepository {
    pool: SqlitePool,
}

impl LeaveRequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new leave request in the Pending state.
    pub async fn create(
        &self,
        input: &LeaveRequestInput,
        number_of_days: i64,
    ) -> Result<LeaveRequest> {
        let now = Utc::now();
        let leave_type_str = input.leave_type.to_string();
        let status_str = LeaveStatus::Pending.to_string();

        let request = sqlx::query_as::<_, LeaveRequest>(
            r#"
            INSERT INTO
                leave_requests (
                    id,
                    employee_id,
                    leave_type,
                    start_date,
                    end_date,
                    number_of_days,
                    reason,
                    status,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                employee_id,
                leave_type,
                start_date,
                end_date,
                number_of_days,
                reason,
                status,
                rejection_reason,
                approved_by,
                approved_at,
                created_at,
                updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.employee_id)
        .bind(leave_type_str)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(number_of_days)
        .bind(&input.reason)
        .bind(status_str)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Self::record_event(
            &self.pool,
            request.id,
            None,
            LeaveStatus::Pending,
            Some(input.employee_id),
            None,
        )
        .await?;

        Ok(request)
    }

    /// Append a row to the transition history.
    async fn record_event<'e, E>(
        executor: E,
        leave_request_id: Uuid,
        from_status: Option<LeaveStatus>,
        to_status: LeaveStatus,
        actor_id: Option<Uuid>,
        note: Option<&str>,
    ) -> Result<()>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO
                leave_request_events (
                    leave_request_id,
                    from_status,
                    to_status,
                    actor_id,
                    note,
                    created_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(leave_request_id)
        .bind(from_status.map(|s| s.to_string()))
        .bind(to_status.to_string())
        .bind(actor_id)
        .bind(note)
        .bind(Utc::now())
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Transition history for a request, oldest first.
    pub async fn events_for(&self, leave_request_id: Uuid) -> Result<Vec<LeaveRequestEvent>> {
        let events = sqlx::query_as::<_, LeaveRequestEvent>(
            r#"
            SELECT
                id,
                leave_request_id,
                from_status,
                to_status,
                actor_id,
                note,
                created_at
            FROM
                leave_request_events
            WHERE
                leave_request_id = ?
            ORDER BY
                id
            "#,
        )
        .bind(leave_request_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Get a specific leave request by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<LeaveRequest>> {
        let request = sqlx::query_as::<_, LeaveRequest>(
            r#"
            SELECT
                id,
                employee_id,
                leave_type,
                start_date,
                end_date,
                number_of_days,
                reason,
                status,
                rejection_reason,
                approved_by,
                approved_at,
                created_at,
                updated_at
            FROM
                leave_requests
            WHERE
                id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// List leave requests with optional filtering
    pub async fn list(
        &self,
        employee_id: Option<Uuid>,
        status: Option<LeaveStatus>,
    ) -> Result<Vec<LeaveRequest>> {
        let mut query = r#"
            SELECT
                id,
                employee_id,
                leave_type,
                start_date,
                end_date,
                number_of_days,
                reason,
                status,
                rejection_reason,
                approved_by,
                approved_at,
                created_at,
                updated_at
            FROM
                leave_requests
            "#
        .to_string();

        let mut conditions = Vec::new();
        if employee_id.is_some() {
            conditions.push("employee_id = ?");
        }
        if status.is_some() {
            conditions.push("status = ?");
        }

        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }

        query.push_str(" ORDER BY created_at DESC");

        let mut prepared = sqlx::query_as::<_, LeaveRequest>(&query);
        if let Some(eid) = employee_id {
            prepared = prepared.bind(eid);
        }
        if let Some(s) = status {
            prepared = prepared.bind(s.to_string());
        }

        let requests = prepared.fetch_all(&self.pool).await?;

        Ok(requests)
    }

    /// Active (Pending or Approved) requests whose inclusive date range
    /// intersects `[start, end]` for the given employee.
    pub async fn find_overlapping(
        &self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LeaveRequest>> {
        let requests = sqlx::query_as::<_, LeaveRequest>(
            r#"
            SELECT
                id,
                employee_id,
                leave_type,
                start_date,
                end_date,
                number_of_days,
                reason,
                status,
                rejection_reason,
                approved_by,
                approved_at,
                created_at,
                updated_at
            FROM
                leave_requests
            WHERE
                employee_id = ?
                AND status IN (?, ?)
                AND start_date <= ?
                AND end_date >= ?
            ORDER BY
                start_date
            "#,
        )
        .bind(employee_id)
        .bind(LeaveStatus::Pending.to_string())
        .bind(LeaveStatus::Approved.to_string())
        .bind(end)
        .bind(start)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Pending -> Approved, guarded on the current status. Runs inside the
    /// caller's transaction so the balance deduction commits with it.
    /// Returns `None` when the request is no longer Pending.
    pub async fn approve(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        id: Uuid,
        approver_id: Uuid,
        approved_at: DateTime<Utc>,
    ) -> Result<Option<LeaveRequest>> {
        let request = sqlx::query_as::<_, LeaveRequest>(
            r#"
            UPDATE leave_requests
            SET
                status = ?,
                approved_by = ?,
                approved_at = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = ?
            RETURNING
                id,
                employee_id,
                leave_type,
                start_date,
                end_date,
                number_of_days,
                reason,
                status,
                rejection_reason,
                approved_by,
                approved_at,
                created_at,
                updated_at
            "#,
        )
        .bind(LeaveStatus::Approved.to_string())
        .bind(approver_id)
        .bind(approved_at)
        .bind(approved_at)
        .bind(id)
        .bind(LeaveStatus::Pending.to_string())
        .fetch_optional(&mut **tx)
        .await?;

        if request.is_some() {
            Self::record_event(
                &mut **tx,
                id,
                Some(LeaveStatus::Pending),
                LeaveStatus::Approved,
                Some(approver_id),
                None,
            )
            .await?;
        }

        Ok(request)
    }

    /// Pending -> Rejected with the reviewer's reason. Returns `None` when
    /// the request is no longer Pending.
    pub async fn reject(
        &self,
        id: Uuid,
        rejector_id: Uuid,
        reason: &str,
    ) -> Result<Option<LeaveRequest>> {
        let now = Utc::now();

        let request = sqlx::query_as::<_, LeaveRequest>(
            r#"
            UPDATE leave_requests
            SET
                status = ?,
                approved_by = ?,
                rejection_reason = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = ?
            RETURNING
                id,
                employee_id,
                leave_type,
                start_date,
                end_date,
                number_of_days,
                reason,
                status,
                rejection_reason,
                approved_by,
                approved_at,
                created_at,
                updated_at
            "#,
        )
        .bind(LeaveStatus::Rejected.to_string())
        .bind(rejector_id)
        .bind(reason)
        .bind(now)
        .bind(id)
        .bind(LeaveStatus::Pending.to_string())
        .fetch_optional(&self.pool)
        .await?;

        if request.is_some() {
            Self::record_event(
                &self.pool,
                id,
                Some(LeaveStatus::Pending),
                LeaveStatus::Rejected,
                Some(rejector_id),
                Some(reason),
            )
            .await?;
        }

        Ok(request)
    }

    /// Transition to Cancelled, guarded on the status the caller observed.
    /// Runs inside the caller's transaction so an accompanying refund commits
    /// with it. Returns `None` when the status changed underneath.
    pub async fn cancel(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        id: Uuid,
        observed_status: LeaveStatus,
    ) -> Result<Option<LeaveRequest>> {
        let now = Utc::now();

        let request = sqlx::query_as::<_, LeaveRequest>(
            r#"
            UPDATE leave_requests
            SET
                status = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = ?
            RETURNING
                id,
                employee_id,
                leave_type,
                start_date,
                end_date,
                number_of_days,
                reason,
                status,
                rejection_reason,
                approved_by,
                approved_at,
                created_at,
                updated_at
            "#,
        )
        .bind(LeaveStatus::Cancelled.to_string())
        .bind(now)
        .bind(id)
        .bind(observed_status.to_string())
        .fetch_optional(&mut **tx)
        .await?;

        if let Some(cancelled) = &request {
            Self::record_event(
                &mut **tx,
                id,
                Some(observed_status),
                LeaveStatus::Cancelled,
                Some(cancelled.employee_id),
                None,
            )
            .await?;
        }

        Ok(request)
    }

    /// Pending requests created before `cutoff`, oldest first.
    pub async fn find_stale_pending(&self, cutoff: DateTime<Utc>) -> Result<Vec<LeaveRequest>> {
        let requests = sqlx::query_as::<_, LeaveRequest>(
            r#"
            SELECT
                id,
                employee_id,
                leave_type,
                start_date,
                end_date,
                number_of_days,
                reason,
                status,
                rejection_reason,
                approved_by,
                approved_at,
                created_at,
                updated_at
            FROM
                leave_requests
            WHERE
                status = ?
                AND created_at < ?
            ORDER BY
                created_at
            "#,
        )
        .bind(LeaveStatus::Pending.to_string())
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Pending -> AutoRejected with a generated reason; no reviewer identity.
    /// Returns `None` when the request was decided since selection.
    pub async fn auto_reject(&self, id: Uuid, reason: &str) -> Result<Option<LeaveRequest>> {
        let now = Utc::now();

        let request = sqlx::query_as::<_, LeaveRequest>(
            r#"
            UPDATE leave_requests
            SET
                status = ?,
                rejection_reason = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = ?
            RETURNING
                id,
                employee_id,
                leave_type,
                start_date,
                end_date,
                number_of_days,
                reason,
                status,
                rejection_reason,
                approved_by,
                approved_at,
                created_at,
                updated_at
            "#,
        )
        .bind(LeaveStatus::AutoRejected.to_string())
        .bind(reason)
        .bind(now)
        .bind(id)
        .bind(LeaveStatus::Pending.to_string())
        .fetch_optional(&self.pool)
        .await?;

        if request.is_some() {
            Self::record_event(
                &self.pool,
                id,
                Some(LeaveStatus::Pending),
                LeaveStatus::AutoRejected,
                None,
                Some(reason),
            )
            .await?;
        }

        Ok(request)
    }
}
