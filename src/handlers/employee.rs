use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::EmployeeInput;
use crate::database::repositories::EmployeeRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;

/// Onboard a new employee; their opening leave balance is created with them.
pub async fn create_employee(
    repo: web::Data<EmployeeRepository>,
    config: web::Data<Config>,
    input: web::Json<EmployeeInput>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();

    if input.name.trim().is_empty() || input.country_code.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Name and country code are required".to_string(),
        ));
    }

    let employee = repo.create(input, &config.policy).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(employee)))
}

/// Get a specific employee by ID
pub async fn get_employee(
    repo: web::Data<EmployeeRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let employee = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", id)))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(employee)))
}
