use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::config::LeavePolicy;
use crate::database::models::{Employee, EmployeeInput};
use crate::database::repositories::LeaveBalanceRepository;

#[derive(Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Onboard a new employee. The opening leave balance is created in the
    /// same transaction; an employee never exists without a balance row.
    pub async fn create(&self, input: EmployeeInput, policy: &LeavePolicy) -> Result<Employee> {
        let now = Utc::now();
        let id = Uuid::new_v4();

        let mut tx = self.pool.begin().await?;

        let employee = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO
                employees (id, name, email, country_code, active, created_at, updated_at)
            VALUES
                (?, ?, ?, ?, 1, ?, ?)
            RETURNING
                id,
                name,
                email,
                country_code,
                active,
                created_at,
                updated_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.country_code)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        LeaveBalanceRepository::insert_default(&mut tx, id, policy).await?;

        tx.commit().await?;

        Ok(employee)
    }

    /// Get a specific employee by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            SELECT
                id,
                name,
                email,
                country_code,
                active,
                created_at,
                updated_at
            FROM
                employees
            WHERE
                id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }
}
