use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{Datelike, NaiveDate, Weekday};
use moka::future::Cache;

use crate::database::repositories::HolidayRepository;
use crate::error::AppError;

const HOLIDAY_CACHE_CAPACITY: u64 = 256;
const HOLIDAY_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Resolves working days against the configured weekend and per-country
/// holiday calendars.
#[derive(Clone)]
pub struct WorkCalendar {
    holidays: HolidayRepository,
    weekend_days: Vec<Weekday>,
    cache: Cache<String, Arc<HashSet<NaiveDate>>>,
}

impl WorkCalendar {
    pub fn new(holidays: HolidayRepository, weekend_days: Vec<Weekday>) -> Self {
        Self {
            holidays,
            weekend_days,
            cache: Cache::builder()
                .max_capacity(HOLIDAY_CACHE_CAPACITY)
                .time_to_live(HOLIDAY_CACHE_TTL)
                .build(),
        }
    }

    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        self.weekend_days.contains(&date.weekday())
    }

    async fn holiday_dates(&self, country_code: &str) -> Result<Arc<HashSet<NaiveDate>>> {
        if let Some(dates) = self.cache.get(country_code).await {
            return Ok(dates);
        }

        let dates: Arc<HashSet<NaiveDate>> = Arc::new(
            self.holidays
                .dates_for_country(country_code)
                .await?
                .into_iter()
                .collect(),
        );
        self.cache
            .insert(country_code.to_string(), dates.clone())
            .await;

        Ok(dates)
    }

    /// Weekends plus listed holidays. An unknown country has no holiday rows
    /// and degrades to weekends only.
    pub async fn is_non_working_day(
        &self,
        date: NaiveDate,
        country_code: &str,
    ) -> Result<bool, AppError> {
        if self.is_weekend(date) {
            return Ok(true);
        }

        let holidays = self.holiday_dates(country_code).await?;
        Ok(holidays.contains(&date))
    }

    /// Working days in the inclusive range `[start, end]`. A range made up
    /// entirely of non-working days is legitimately 0; callers decide what
    /// that means.
    pub async fn working_days_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        country_code: &str,
    ) -> Result<i64, AppError> {
        if start > end {
            return Err(AppError::BadRequest(format!(
                "Invalid date range: start {} is after end {}",
                start, end
            )));
        }

        let holidays = self.holiday_dates(country_code).await?;

        let mut days = 0;
        for day in start.iter_days() {
            if day > end {
                break;
            }
            if !self.is_weekend(day) && !holidays.contains(&day) {
                days += 1;
            }
        }

        Ok(days)
    }

    /// Drop the cached holiday set after calendar administration.
    pub async fn invalidate_country(&self, country_code: &str) {
        self.cache.invalidate(country_code).await;
    }
}
