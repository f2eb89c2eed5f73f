use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, web};
use anyhow::Result;

use leavedesk::Config;
use leavedesk::database::{
    init_database,
    repositories::{
        EmployeeRepository, HolidayRepository, LeaveBalanceRepository, LeaveRequestRepository,
    },
};
use leavedesk::handlers::{balance, employee, holiday, leave, sweep};
use leavedesk::middleware::RequestId;
use leavedesk::services::{LeaveService, Scheduler, SweepService, WorkCalendar};

const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("LeaveDesk API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    println!("🚀 Starting LeaveDesk API server...");

    // Load configuration
    let config = Config::from_env()?;
    println!(
        "📋 Configuration loaded (environment: {})",
        config.environment
    );

    // Initialize database
    let pool = init_database(&config.database_url).await?;
    println!("✅ Database initialized");

    // Initialize repositories and services
    let employee_repository = EmployeeRepository::new(pool.clone());
    let holiday_repository = HolidayRepository::new(pool.clone());
    let leave_request_repository = LeaveRequestRepository::new(pool.clone());
    let leave_balance_repository = LeaveBalanceRepository::new(pool.clone());

    let calendar = WorkCalendar::new(holiday_repository.clone(), config.weekend_days.clone());
    let leave_service = LeaveService::new(
        pool.clone(),
        employee_repository.clone(),
        leave_request_repository.clone(),
        leave_balance_repository.clone(),
        calendar.clone(),
    );
    let sweep_service = SweepService::new(
        leave_request_repository,
        leave_balance_repository,
        config.policy.clone(),
        config.auto_reject_after_days,
    );

    // Register the batch sweeps on the scheduler. The rollover job runs on
    // the same daily cadence; it only acts on balances not yet reset for the
    // current year, so firings outside a year boundary are no-ops.
    let mut scheduler = Scheduler::new();
    {
        let sweeps = sweep_service.clone();
        scheduler.register("auto-reject-sweep", SWEEP_INTERVAL, move || {
            let sweeps = sweeps.clone();
            async move {
                if let Err(err) = sweeps.run_auto_reject().await {
                    log::error!("Auto-reject sweep failed: {}", err);
                }
            }
        });
    }
    {
        let sweeps = sweep_service.clone();
        scheduler.register("year-end-rollover", SWEEP_INTERVAL, move || {
            let sweeps = sweeps.clone();
            async move {
                if let Err(err) = sweeps.run_rollover().await {
                    log::error!("Year-end rollover failed: {}", err);
                }
            }
        });
    }
    scheduler.start();
    println!("⏰ Scheduler started ({} jobs)", scheduler.job_count());

    // Wrap shared state for the application
    let employee_repo_data = web::Data::new(employee_repository);
    let holiday_repo_data = web::Data::new(holiday_repository);
    let calendar_data = web::Data::new(calendar);
    let leave_service_data = web::Data::new(leave_service);
    let sweep_service_data = web::Data::new(sweep_service);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    println!("🌐 Server starting on http://{}", server_address);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(employee_repo_data.clone())
            .app_data(holiday_repo_data.clone())
            .app_data(calendar_data.clone())
            .app_data(leave_service_data.clone())
            .app_data(sweep_service_data.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin("http://localhost:3000")
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Requested-With",
                        "X-Correlation-ID",
                    ])
                    .max_age(3600),
            )
            .wrap(RequestId)
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{User-Agent}i" %T correlation_id=%{x-correlation-id}o"#,
            ))
            .service(hello)
            .service(health)
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
                            .route("", web::get().to(holiday::get_holidays))
                            .route("/{id}", web::delete().to(holiday::delete_holiday)),
                    )
                    .service(
                        web::scope("/sweeps")
                            .route("/auto-reject", web::post().to(sweep::run_auto_reject))
                            .route("/rollover", web::post().to(sweep::run_rollover)),
                    ),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    scheduler.stop();
    Ok(())
}
