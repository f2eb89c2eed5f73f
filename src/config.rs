use anyhow::Result;
use chrono::Weekday;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub weekend_days: Vec<Weekday>,
    pub auto_reject_after_days: i64,
    pub policy: LeavePolicy,
}

/// Annual entitlement quotas and carry-forward caps, in whole days.
#[derive(Debug, Clone)]
pub struct LeavePolicy {
    pub casual_quota: i64,
    pub sick_quota: i64,
    pub earned_quota: i64,
    pub maternity_quota: i64,
    pub paternity_quota: i64,
    pub compensatory_quota: i64,
    pub casual_max_carry: i64,
    pub earned_max_carry: i64,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        LeavePolicy {
            casual_quota: 12,
            sick_quota: 10,
            earned_quota: 15,
            maternity_quota: 90,
            paternity_quota: 15,
            compensatory_quota: 0,
            casual_max_carry: 5,
            earned_max_carry: 15,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let defaults = LeavePolicy::default();

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:leavedesk.db".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            weekend_days: parse_weekend_days(
                &env::var("WEEKEND_DAYS").unwrap_or_else(|_| "sat,sun".to_string()),
            ),
            auto_reject_after_days: env_i64("AUTO_REJECT_AFTER_DAYS", 7),
            policy: LeavePolicy {
                casual_quota: env_i64("CASUAL_LEAVE_QUOTA", defaults.casual_quota),
                sick_quota: env_i64("SICK_LEAVE_QUOTA", defaults.sick_quota),
                earned_quota: env_i64("EARNED_LEAVE_QUOTA", defaults.earned_quota),
                maternity_quota: env_i64("MATERNITY_LEAVE_QUOTA", defaults.maternity_quota),
                paternity_quota: env_i64("PATERNITY_LEAVE_QUOTA", defaults.paternity_quota),
                compensatory_quota: env_i64(
                    "COMPENSATORY_LEAVE_QUOTA",
                    defaults.compensatory_quota,
                ),
                casual_max_carry: env_i64("CASUAL_MAX_CARRY_FORWARD", defaults.casual_max_carry),
                earned_max_carry: env_i64("EARNED_MAX_CARRY_FORWARD", defaults.earned_max_carry),
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_i64(name: &str, default: i64) -> i64 {
    env::var(name)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

/// Comma-separated weekday names, e.g. "fri,sat". Unparseable entries are
/// ignored; an empty result falls back to Saturday/Sunday.
fn parse_weekend_days(raw: &str) -> Vec<Weekday> {
    let days: Vec<Weekday> = raw
        .split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect();

    if days.is_empty() {
        vec![Weekday::Sat, Weekday::Sun]
    } else {
        days
    }
}
