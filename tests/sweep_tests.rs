use chrono::{Duration, Utc};
use leavedesk::AppError;
use leavedesk::database::models::{LeaveStatus, LeaveType};
use pretty_assertions::assert_eq;
use serial_test::serial;
use uuid::Uuid;

mod common;

async fn backdate_request(ctx: &common::TestContext, id: Uuid, days: i64) {
    sqlx::query("UPDATE leave_requests SET created_at = ? WHERE id = ?")
        .bind(Utc::now() - Duration::days(days))
        .bind(id)
        .execute(&ctx.pool)
        .await
        .expect("failed to backdate request");
}

#[tokio::test]
#[serial]
async fn auto_reject_sweeps_only_stale_requests_and_is_idempotent() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let employee = ctx.onboard("Asha Rao", "asha@example.com", "IN").await;

    let stale = ctx
        .leave_service
        .apply(common::leave_input(
            employee.id,
            LeaveType::Casual,
            common::date(2026, 8, 3),
            common::date(2026, 8, 5),
        ))
        .await
        .unwrap();
    let fresh = ctx
        .leave_service
        .apply(common::leave_input(
            employee.id,
            LeaveType::Casual,
            common::date(2026, 8, 10),
            common::date(2026, 8, 12),
        ))
        .await
        .unwrap();

    // Only the first request has been waiting past the 7-day threshold.
    backdate_request(&ctx, stale.id, 10).await;

    let outcome = ctx.sweep_service.run_auto_reject().await.unwrap();
    assert_eq!(outcome.rejected, 1);

    let stale = ctx.leave_service.get(stale.id).await.unwrap();
    assert_eq!(stale.status, LeaveStatus::AutoRejected);
    assert!(
        stale
            .rejection_reason
            .as_deref()
            .unwrap_or_default()
            .contains("7 days")
    );

    let fresh = ctx.leave_service.get(fresh.id).await.unwrap();
    assert_eq!(fresh.status, LeaveStatus::Pending);

    // Pending requests were never deducted, so the sweep touches no balance.
    let balance = ctx.leave_service.balance_of(employee.id).await.unwrap();
    assert_eq!(balance.casual_current, 12);

    // A second pass finds nothing further to do.
    let outcome = ctx.sweep_service.run_auto_reject().await.unwrap();
    assert_eq!(outcome.rejected, 0);
}

#[tokio::test]
#[serial]
async fn auto_rejected_requests_are_terminal() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let employee = ctx.onboard("Asha Rao", "asha@example.com", "IN").await;

    let request = ctx
        .leave_service
        .apply(common::leave_input(
            employee.id,
            LeaveType::Casual,
            common::date(2026, 8, 3),
            common::date(2026, 8, 5),
        ))
        .await
        .unwrap();
    backdate_request(&ctx, request.id, 30).await;

    let outcome = ctx.sweep_service.run_auto_reject().await.unwrap();
    assert_eq!(outcome.rejected, 1);

    let err = ctx
        .leave_service
        .cancel(request.id, employee.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::StateConflict(_)));
}

#[tokio::test]
#[serial]
async fn rollover_carries_capped_days_and_resets_quotas() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let employee = ctx.onboard("Asha Rao", "asha@example.com", "IN").await;

    // A year-old balance with part of the entitlement consumed: 8 casual and
    // 20 earned days left, sick nearly spent.
    sqlx::query(
        r#"
        UPDATE leave_balances
        SET
            casual_current = 8,
            earned_current = 20,
            sick_current = 2,
            last_reset_date = ?
        WHERE
            employee_id = ?
        "#,
    )
    .bind(common::date(2025, 1, 1))
    .bind(employee.id)
    .execute(&ctx.pool)
    .await
    .unwrap();

    let outcome = ctx.sweep_service.run_rollover_for_year(2026).await.unwrap();
    assert_eq!(outcome.updated, 1);
    assert_eq!(outcome.errors, 0);

    let balance = ctx.leave_service.balance_of(employee.id).await.unwrap();
    // Casual carries min(8, 5); earned carries min(20, 15); sick resets flat.
    assert_eq!(balance.casual_carried, 5);
    assert_eq!(balance.casual_current, 12 + 5);
    assert_eq!(balance.earned_carried, 15);
    assert_eq!(balance.earned_current, 15 + 15);
    assert_eq!(balance.sick_current, 10);
    // Granted types stay put.
    assert_eq!(balance.maternity_current, 90);
    assert_eq!(balance.paternity_current, 15);
    assert_eq!(balance.last_reset_date, common::date(2026, 1, 1));
}

#[tokio::test]
#[serial]
async fn rollover_twice_in_one_year_is_a_noop() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let employee = ctx.onboard("Asha Rao", "asha@example.com", "IN").await;

    sqlx::query(
        "UPDATE leave_balances SET casual_current = 8, last_reset_date = ? WHERE employee_id = ?",
    )
    .bind(common::date(2025, 1, 1))
    .bind(employee.id)
    .execute(&ctx.pool)
    .await
    .unwrap();

    let first = ctx.sweep_service.run_rollover_for_year(2026).await.unwrap();
    assert_eq!(first.updated, 1);
    let after_first = ctx.leave_service.balance_of(employee.id).await.unwrap();

    let second = ctx.sweep_service.run_rollover_for_year(2026).await.unwrap();
    assert_eq!(second.updated, 0);
    assert_eq!(second.skipped, 1);

    let after_second = ctx.leave_service.balance_of(employee.id).await.unwrap();
    assert_eq!(after_second.casual_current, after_first.casual_current);
    assert_eq!(after_second.casual_carried, after_first.casual_carried);
    assert_eq!(after_second.last_reset_date, after_first.last_reset_date);
}

#[tokio::test]
#[serial]
async fn rollover_leaves_current_year_balances_alone() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let employee = ctx.onboard("Asha Rao", "asha@example.com", "IN").await;

    // Freshly onboarded balances are already stamped with this year.
    let outcome = ctx.sweep_service.run_rollover().await.unwrap();
    assert_eq!(outcome.updated, 0);
    assert_eq!(outcome.skipped, 1);

    let balance = ctx.leave_service.balance_of(employee.id).await.unwrap();
    assert_eq!(balance.casual_current, 12);
    assert_eq!(balance.casual_carried, 0);
}
