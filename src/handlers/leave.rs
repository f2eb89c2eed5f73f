use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{LeaveRequestInput, LeaveStatus};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::LeaveService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveQuery {
    pub employee_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalInput {
    pub approver_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionInput {
    pub rejector_id: Uuid,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationInput {
    pub employee_id: Uuid,
}

/// File a new leave request
pub async fn apply_leave(
    service: web::Data<LeaveService>,
    input: web::Json<LeaveRequestInput>,
) -> Result<HttpResponse, AppError> {
    let request = service.apply(input.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(request)))
}

/// List leave requests with optional filtering
pub async fn get_leave_requests(
    service: web::Data<LeaveService>,
    query: web::Query<LeaveQuery>,
) -> Result<HttpResponse, AppError> {
    let status = match &query.status {
        Some(raw) => Some(raw.parse::<LeaveStatus>().map_err(AppError::BadRequest)?),
        None => None,
    };

    let requests = service.list(query.employee_id, status).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

/// Get a specific leave request by ID
pub async fn get_leave_request(
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let request = service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

/// Get the transition history of a leave request
pub async fn get_leave_history(
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let events = service.history(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(events)))
}

/// Approve a pending leave request, deducting the balance
pub async fn approve_leave(
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
    input: web::Json<ApprovalInput>,
) -> Result<HttpResponse, AppError> {
    let request = service
        .approve(path.into_inner(), input.approver_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

/// Reject a pending leave request with a mandatory reason
pub async fn reject_leave(
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
    input: web::Json<RejectionInput>,
) -> Result<HttpResponse, AppError> {
    let request = service
        .reject(path.into_inner(), input.rejector_id, &input.reason)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

/// Cancel a pending or approved leave request (owner only)
pub async fn cancel_leave(
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
    input: web::Json<CancellationInput>,
) -> Result<HttpResponse, AppError> {
    let request = service
        .cancel(path.into_inner(), input.employee_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}
