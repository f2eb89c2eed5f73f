use actix_web::{App, http::StatusCode, test, web};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use uuid::Uuid;

use leavedesk::database::models::LeaveType;
use leavedesk::handlers::{balance, employee, holiday, leave, sweep};

mod common;

macro_rules! test_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($ctx.employees.clone()))
                .app_data(web::Data::new($ctx.holidays.clone()))
                .app_data(web::Data::new($ctx.calendar.clone()))
                .app_data(web::Data::new($ctx.leave_service.clone()))
                .app_data(web::Data::new($ctx.sweep_service.clone()))
                .app_data(web::Data::new($ctx.config.clone()))
                .service(
                    web::scope("/api/v1")
                        .service(
                            web::scope("/employees")
                                .route("", web::post().to(employee::create_employee))
                                .route("/{id}", web::get().to(employee::get_employee)),
                        )
                        .service(
                            web::scope("/leaves")
                                .route("", web::post().to(leave::apply_leave))
                                .route("", web::get().to(leave::get_leave_requests))
                                .route("/{id}", web::get().to(leave::get_leave_request))
                                .route("/{id}/history", web::get().to(leave::get_leave_history))
                                .route("/{id}/approve", web::post().to(leave::approve_leave))
                                .route("/{id}/reject", web::post().to(leave::reject_leave))
                                .route("/{id}/cancel", web::post().to(leave::cancel_leave)),
                        )
                        .service(
                            web::scope("/balances")
                                .route("/{employee_id}", web::get().to(balance::get_leave_balance)),
                        )
                        .service(
                            web::scope("/holidays")
                                .route("", web::post().to(holiday::create_holiday))
                                .route("", web::get().to(holiday::get_holidays)),
                        )
                        .service(
                            web::scope("/sweeps")
                                .route("/auto-reject", web::post().to(sweep::run_auto_reject))
                                .route("/rollover", web::post().to(sweep::run_rollover)),
                        ),
                ),
        )
        .await
    };
}

#[actix_web::test]
async fn leave_lifecycle_over_http() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let app = test_app!(ctx);

    // Onboard an employee; the opening balance comes with them.
    let req = test::TestRequest::post()
        .uri("/api/v1/employees")
        .set_json(&json!({
            "name": "Asha Rao",
            "email": "asha@example.com",
            "countryCode": "IN"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(true));
    let employee_id = body["data"]["id"].as_str().unwrap().to_string();

    // Apply for three working days.
    let req = test::TestRequest::post()
        .uri("/api/v1/leaves")
        .set_json(&json!({
            "employeeId": employee_id,
            "leaveType": "casual",
            "startDate": "2026-08-03",
            "endDate": "2026-08-05",
            "reason": "Family time"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], json!("pending"));
    assert_eq!(body["data"]["numberOfDays"], json!(3));
    let leave_id = body["data"]["id"].as_str().unwrap().to_string();

    // Pending requests do not consume balance.
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/balances/{}", employee_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["casualCurrent"], json!(12));

    // Approval deducts.
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/leaves/{}/approve", leave_id))
        .set_json(&json!({ "approverId": Uuid::new_v4() }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], json!("approved"));

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/balances/{}", employee_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["casualCurrent"], json!(9));
}

#[actix_web::test]
async fn overlap_conflicts_are_reported_with_details() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let employee = ctx.onboard("Asha Rao", "asha@example.com", "IN").await;

    ctx.leave_service
        .apply(common::leave_input(
            employee.id,
            LeaveType::Casual,
            common::date(2026, 8, 3),
            common::date(2026, 8, 5),
        ))
        .await
        .unwrap();

    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/leaves")
        .set_json(&json!({
            "employeeId": employee.id,
            "leaveType": "earned",
            "startDate": "2026-08-05",
            "endDate": "2026-08-07",
            "reason": "Travel"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    let conflicts = body["data"].as_array().unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0]["leaveType"], json!("casual"));
}

#[actix_web::test]
async fn rejection_without_a_reason_is_a_bad_request() {
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

    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/leaves/{}/reject", request.id))
        .set_json(&json!({ "rejectorId": Uuid::new_v4(), "reason": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
}

#[actix_web::test]
async fn unknown_leave_request_is_not_found() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/leaves/{}/approve", Uuid::new_v4()))
        .set_json(&json!({ "approverId": Uuid::new_v4() }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn sweeps_can_be_triggered_over_http() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    ctx.onboard("Asha Rao", "asha@example.com", "IN").await;
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/sweeps/auto-reject")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["rejected"], json!(0));

    let req = test::TestRequest::post()
        .uri("/api/v1/sweeps/rollover")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["updated"], json!(0));
    assert_eq!(body["data"]["skipped"], json!(1));
}
