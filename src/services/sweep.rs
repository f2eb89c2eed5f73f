use chrono::{Datelike, Duration, Utc};
use serde::Serialize;

use crate::config::LeavePolicy;
use crate::database::repositories::{LeaveBalanceRepository, LeaveRequestRepository};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AutoRejectOutcome {
    pub rejected: u64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RolloverOutcome {
    pub updated: u64,
    pub skipped: u64,
    pub errors: u64,
}

/// The two batch jobs: the daily auto-reject sweep and the year-end
/// rollover. Both are idempotent; a failure on one record is logged and the
/// sweep moves on.
#[derive(Clone)]
pub struct SweepService {
    requests: LeaveRequestRepository,
    balances: LeaveBalanceRepository,
    policy: LeavePolicy,
    auto_reject_after_days: i64,
}

impl SweepService {
    pub fn new(
        requests: LeaveRequestRepository,
        balances: LeaveBalanceRepository,
        policy: LeavePolicy,
        auto_reject_after_days: i64,
    ) -> Self {
        Self {
            requests,
            balances,
            policy,
            auto_reject_after_days,
        }
    }

    /// Bulk-transition Pending requests older than the configured threshold.
    /// Balances are never touched; Pending requests were never deducted.
    pub async fn run_auto_reject(&self) -> Result<AutoRejectOutcome, AppError> {
        let cutoff = Utc::now() - Duration::days(self.auto_reject_after_days);
        let stale = self.requests.find_stale_pending(cutoff).await?;
        let reason = format!(
            "Automatically rejected: no decision within {} days",
            self.auto_reject_after_days
        );

        let mut rejected = 0;
        for request in stale {
            match self.requests.auto_reject(request.id, &reason).await {
                Ok(Some(_)) => rejected += 1,
                // Decided between selection and update; nothing to do.
                Ok(None) => {}
                Err(err) => {
                    log::error!("Auto-reject sweep failed for request {}: {}", request.id, err);
                }
            }
        }

        if rejected > 0 {
            log::info!("Auto-reject sweep rejected {} stale request(s)", rejected);
        }
        Ok(AutoRejectOutcome { rejected })
    }

    /// Reset annual quotas and carry forward unused casual/earned days for
    /// every balance not yet reset this year.
    pub async fn run_rollover(&self) -> Result<RolloverOutcome, AppError> {
        self.run_rollover_for_year(Utc::now().year()).await
    }

    pub async fn run_rollover_for_year(&self, year: i32) -> Result<RolloverOutcome, AppError> {
        let balances = self.balances.list_all().await?;

        let mut updated = 0;
        let mut skipped = 0;
        let mut errors = 0;

        for balance in balances {
            if balance.last_reset_date.year() >= year {
                skipped += 1;
                continue;
            }

            let Some(rolled) = balance.rollover_values(&self.policy, year) else {
                errors += 1;
                log::error!(
                    "Rollover failed for employee {}: invalid target year {}",
                    balance.employee_id,
                    year
                );
                continue;
            };

            match self
                .balances
                .apply_rollover(balance.employee_id, &rolled, balance.last_reset_date)
                .await
            {
                Ok(true) => updated += 1,
                // Another run reset this row first.
                Ok(false) => skipped += 1,
                Err(err) => {
                    errors += 1;
                    log::error!(
                        "Rollover failed for employee {}: {}",
                        balance.employee_id,
                        err
                    );
                }
            }
        }

        log::info!(
            "Year-end rollover: {} updated, {} skipped, {} error(s)",
            updated,
            skipped,
            errors
        );
        Ok(RolloverOutcome {
            updated,
            skipped,
            errors,
        })
    }
}
