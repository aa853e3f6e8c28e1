use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{AddSlotRequest, DaySchedule, TimeSlot, WeekQuery};
use crate::services::AvailabilityStore;

#[axum::debug_handler]
pub async fn get_week(
    State(store): State<AvailabilityStore>,
    Extension(user): Extension<User>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<Vec<DaySchedule>>, AppError> {
    let from = query.from.unwrap_or_else(|| Utc::now().date_naive());
    Ok(Json(store.get_week(&user.id, from).await?))
}

#[axum::debug_handler]
pub async fn get_day(
    State(store): State<AvailabilityStore>,
    Extension(user): Extension<User>,
    Path(date): Path<NaiveDate>,
) -> Json<DaySchedule> {
    Json(store.get_day(&user.id, date).await)
}

#[axum::debug_handler]
pub async fn toggle_day(
    State(store): State<AvailabilityStore>,
    Extension(user): Extension<User>,
    Path(date): Path<NaiveDate>,
) -> Json<DaySchedule> {
    Json(store.toggle_day(&user.id, date).await)
}

#[axum::debug_handler]
pub async fn add_slot(
    State(store): State<AvailabilityStore>,
    Extension(user): Extension<User>,
    Path(date): Path<NaiveDate>,
    Json(request): Json<AddSlotRequest>,
) -> Result<(StatusCode, Json<TimeSlot>), AppError> {
    let slot = store.add_slot(&user.id, date, request).await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

#[axum::debug_handler]
pub async fn remove_slot(
    State(store): State<AvailabilityStore>,
    Extension(user): Extension<User>,
    Path((date, slot_id)): Path<(NaiveDate, Uuid)>,
) -> Result<StatusCode, AppError> {
    store.remove_slot(&user.id, date, slot_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn toggle_slot(
    State(store): State<AvailabilityStore>,
    Extension(user): Extension<User>,
    Path((date, slot_id)): Path<(NaiveDate, Uuid)>,
) -> Result<Json<TimeSlot>, AppError> {
    let slot = store.toggle_slot(&user.id, date, slot_id).await?;
    Ok(Json(slot))
}
