use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::HolidayInput;
use crate::database::repositories::HolidayRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::WorkCalendar;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayQuery {
    pub country_code: Option<String>,
}

/// Add a holiday to a country's calendar
pub async fn create_holiday(
    repo: web::Data<HolidayRepository>,
    calendar: web::Data<WorkCalendar>,
    input: web::Json<HolidayInput>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();

    if input.country_code.trim().is_empty() || input.name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Country code and holiday name are required".to_string(),
        ));
    }

    let holiday = repo.create(&input).await?;
    calendar.invalidate_country(&holiday.country_code).await;

    Ok(HttpResponse::Created().json(ApiResponse::success(holiday)))
}

/// List holidays, optionally for one country
pub async fn get_holidays(
    repo: web::Data<HolidayRepository>,
    query: web::Query<HolidayQuery>,
) -> Result<HttpResponse, AppError> {
    let holidays = repo.list(query.country_code.as_deref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(holidays)))
}

/// Remove a holiday from its country's calendar
pub async fn delete_holiday(
    repo: web::Data<HolidayRepository>,
    calendar: web::Data<WorkCalendar>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let holiday = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Holiday {} not found", id)))?;

    repo.delete(id).await?;
    calendar.invalidate_country(&holiday.country_code).await;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Holiday removed",
    )))
}
