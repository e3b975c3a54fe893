use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::auth::auth::AuthUser;
use crate::model::holiday::{CreateHoliday, HolidayCheckQuery, HolidayFilter, UpdateHoliday};
use crate::state::AppState;
use crate::utils::pagination::PageQuery;

/// List holidays
#[utoipa::path(
    get,
    path = "/api/holidays",
    params(HolidayFilter, PageQuery),
    responses(
        (status = 200, description = "One page of holidays ordered by date", body = crate::model::holiday::HolidayListResponse),
        (status = 400, description = "Month out of range", body = Object, example = json!({
            "message": "month must be between 1 and 12"
        }))
    ),
    tag = "Holiday",
    security(("bearer_auth" = []))
)]
pub async fn list_holidays(
    _auth: AuthUser,
    state: web::Data<AppState>,
    filter: web::Query<HolidayFilter>,
    page: web::Query<PageQuery>,
) -> actix_web::Result<HttpResponse> {
    let holidays = state.holidays.list(&filter, page.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(holidays))
}

/// Create holiday
#[utoipa::path(
    post,
    path = "/api/holidays",
    request_body = CreateHoliday,
    responses(
        (status = 201, description = "Holiday created", body = crate::model::holiday::Holiday),
        (status = 400, description = "Invalid input or an active holiday already on that date", body = Object, example = json!({
            "message": "An active holiday already exists on 2026-12-16 (Victory Day)"
        }))
    ),
    tag = "Holiday",
    security(("bearer_auth" = []))
)]
pub async fn create_holiday(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<CreateHoliday>,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;

    let holiday = state.holidays.create(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(holiday))
}

/// Is the date a holiday
#[utoipa::path(
    get,
    path = "/api/holidays/check",
    params(HolidayCheckQuery),
    responses((status = 200, description = "Holidays falling on the date", body = crate::model::holiday::HolidayCheck)),
    tag = "Holiday",
    security(("bearer_auth" = []))
)]
pub async fn check_holiday(
    _auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<HolidayCheckQuery>,
) -> actix_web::Result<HttpResponse> {
    let check = state.holidays.check(query.date).await?;
    Ok(HttpResponse::Ok().json(check))
}

/// Get holiday
#[utoipa::path(
    get,
    path = "/api/holidays/{id}",
    params(("id" = u64, Path, description = "Holiday id")),
    responses(
        (status = 200, description = "Holiday", body = crate::model::holiday::Holiday),
        (status = 404, description = "Missing or deleted")
    ),
    tag = "Holiday",
    security(("bearer_auth" = []))
)]
pub async fn get_holiday(
    _auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    let holiday = state.holidays.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(holiday))
}

/// Update holiday
#[utoipa::path(
    put,
    path = "/api/holidays/{id}",
    params(("id" = u64, Path, description = "Holiday id")),
    request_body = UpdateHoliday,
    responses(
        (status = 200, description = "Updated holiday", body = crate::model::holiday::Holiday),
        (status = 400, description = "Invalid input or date taken"),
        (status = 404, description = "Missing or deleted")
    ),
    tag = "Holiday",
    security(("bearer_auth" = []))
)]
pub async fn update_holiday(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: web::Json<UpdateHoliday>,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;

    let holiday = state.holidays.update(path.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(holiday))
}

/// Soft-delete holiday
#[utoipa::path(
    delete,
    path = "/api/holidays/{id}",
    params(("id" = u64, Path, description = "Holiday id")),
    responses(
        (status = 200, description = "Holiday deactivated and marked deleted", body = Object, example = json!({
            "message": "Holiday deleted"
        })),
        (status = 404, description = "Missing or already deleted")
    ),
    tag = "Holiday",
    security(("bearer_auth" = []))
)]
pub async fn delete_holiday(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;

    state.holidays.soft_delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Holiday deleted" })))
}
