use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::LeaveService;

/// Get the leave balance for an employee
pub async fn get_leave_balance(
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let balance = service.balance_of(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(balance)))
}
