use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{Holiday, HolidayInput};

#[derive(Clone)]
pub struct HolidayRepository {
    pool: SqlitePool,
}

impl HolidayRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a holiday to a country's calendar
    pub async fn create(&self, input: &HolidayInput) -> Result<Holiday> {
        let holiday = sqlx::query_as::<_, Holiday>(
            r#"
            INSERT INTO
                holidays (id, country_code, date, name, created_at)
            VALUES
                (?, ?, ?, ?, ?)
            RETURNING
                id,
                country_code,
                date,
                name,
                created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.country_code)
        .bind(input.date)
        .bind(&input.name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(holiday)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Holiday>> {
        let holiday = sqlx::query_as::<_, Holiday>(
            r#"
            SELECT
                id,
                country_code,
                date,
                name,
                created_at
            FROM
                holidays
            WHERE
                id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(holiday)
    }

    /// List holidays, optionally restricted to one country
    pub async fn list(&self, country_code: Option<&str>) -> Result<Vec<Holiday>> {
        let mut query = r#"
            SELECT
                id,
                country_code,
                date,
                name,
                created_at
            FROM
                holidays
            "#
        .to_string();

        if country_code.is_some() {
            query.push_str(" WHERE country_code = ?");
        }
        query.push_str(" ORDER BY date");

        let mut prepared = sqlx::query_as::<_, Holiday>(&query);
        if let Some(code) = country_code {
            prepared = prepared.bind(code.to_string());
        }

        let holidays = prepared.fetch_all(&self.pool).await?;

        Ok(holidays)
    }

    /// Bare holiday dates for a country; empty for an unknown country.
    pub async fn dates_for_country(&self, country_code: &str) -> Result<Vec<NaiveDate>> {
        let dates = sqlx::query_scalar::<_, NaiveDate>(
            r#"
            SELECT
                date
            FROM
                holidays
            WHERE
                country_code = ?
            "#,
        )
        .bind(country_code)
        .fetch_all(&self.pool)
        .await?;

        Ok(dates)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM holidays WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
