use actix_web::{HttpResponse, web};

use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::SweepService;

/// Run the auto-reject sweep immediately
pub async fn run_auto_reject(
    service: web::Data<SweepService>,
) -> Result<HttpResponse, AppError> {
    let outcome = service.run_auto_reject().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
}

/// Run the year-end rollover sweep immediately
pub async fn run_rollover(service: web::Data<SweepService>) -> Result<HttpResponse, AppError> {
    let outcome = service.run_rollover().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
}
