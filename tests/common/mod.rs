use anyhow::Result;
use chrono::{NaiveDate, Weekday};
use sqlx::SqlitePool;
use std::env;
use tempfile::TempDir;
use uuid::Uuid;

use leavedesk::config::{Config, LeavePolicy};
use leavedesk::database::init_database;
use leavedesk::database::models::{Employee, EmployeeInput, HolidayInput, LeaveRequestInput, LeaveType};
use leavedesk::database::repositories::{
    EmployeeRepository, HolidayRepository, LeaveBalanceRepository, LeaveRequestRepository,
};
use leavedesk::services::{LeaveService, SweepService, WorkCalendar};

// Everything here is shared across test binaries; not every binary uses
// every helper.
#[allow(dead_code)]
pub struct TestContext {
    pub pool: SqlitePool,
    pub config: Config,
    pub employees: EmployeeRepository,
    pub holidays: HolidayRepository,
    pub requests: LeaveRequestRepository,
    pub balances: LeaveBalanceRepository,
    pub calendar: WorkCalendar,
    pub leave_service: LeaveService,
    pub sweep_service: SweepService,
    _temp_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let database_url = format!("sqlite:{}/test.db", temp_dir.path().display());
        let pool = init_database(&database_url).await?;

        let config = Config {
            database_url,
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            weekend_days: vec![Weekday::Sat, Weekday::Sun],
            auto_reject_after_days: 7,
            policy: LeavePolicy::default(),
        };

        let employees = EmployeeRepository::new(pool.clone());
        let holidays = HolidayRepository::new(pool.clone());
        let requests = LeaveRequestRepository::new(pool.clone());
        let balances = LeaveBalanceRepository::new(pool.clone());

        let calendar = WorkCalendar::new(holidays.clone(), config.weekend_days.clone());
        let leave_service = LeaveService::new(
            pool.clone(),
            employees.clone(),
            requests.clone(),
            balances.clone(),
            calendar.clone(),
        );
        let sweep_service = SweepService::new(
            requests.clone(),
            balances.clone(),
            config.policy.clone(),
            config.auto_reject_after_days,
        );

        Ok(TestContext {
            pool,
            config,
            employees,
            holidays,
            requests,
            balances,
            calendar,
            leave_service,
            sweep_service,
            _temp_dir: temp_dir,
        })
    }

    #[allow(dead_code)]
    pub async fn onboard(&self, name: &str, email: &str, country_code: &str) -> Employee {
        self.employees
            .create(
                EmployeeInput {
                    name: name.to_string(),
                    email: email.to_string(),
                    country_code: country_code.to_string(),
                },
                &self.config.policy,
            )
            .await
            .expect("failed to onboard test employee")
    }

    #[allow(dead_code)]
    pub async fn add_holiday(&self, country_code: &str, date: NaiveDate, name: &str) {
        self.holidays
            .create(&HolidayInput {
                country_code: country_code.to_string(),
                date,
                name: name.to_string(),
            })
            .await
            .expect("failed to create test holiday");
        self.calendar.invalidate_country(country_code).await;
    }
}

#[allow(dead_code)]
pub fn leave_input(
    employee_id: Uuid,
    leave_type: LeaveType,
    start: NaiveDate,
    end: NaiveDate,
) -> LeaveRequestInput {
    LeaveRequestInput {
        employee_id,
        leave_type,
        start_date: start,
        end_date: end,
        reason: "Family time".to_string(),
    }
}

#[allow(dead_code)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

#[allow(dead_code)]
pub fn setup_test_env() {
    unsafe {
        env::set_var("RUST_LOG", "debug");
    }
    let _ = env_logger::builder().is_test(true).try_init();
}
