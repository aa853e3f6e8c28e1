use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CreateReferralRequest, Referral, ReferralFilter};
use crate::services::ReferralStore;

#[axum::debug_handler]
pub async fn list_referrals(
    State(store): State<ReferralStore>,
    Query(filter): Query<ReferralFilter>,
) -> Json<Vec<Referral>> {
    Json(store.list(&filter).await)
}

#[axum::debug_handler]
pub async fn create_referral(
    State(store): State<ReferralStore>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateReferralRequest>,
) -> Result<(StatusCode, Json<Referral>), AppError> {
    let referral = store.create(&user.id, request).await?;
    Ok((StatusCode::CREATED, Json(referral)))
}

#[axum::debug_handler]
pub async fn get_referral(
    State(store): State<ReferralStore>,
    Path(id): Path<Uuid>,
) -> Result<Json<Referral>, AppError> {
    Ok(Json(store.get(id).await?))
}

#[axum::debug_handler]
pub async fn advance_referral(
    State(store): State<ReferralStore>,
    Path(id): Path<Uuid>,
) -> Result<Json<Referral>, AppError> {
    Ok(Json(store.advance(id).await?))
}

#[axum::debug_handler]
pub async fn cancel_referral(
    State(store): State<ReferralStore>,
    Path(id): Path<Uuid>,
) -> Result<Json<Referral>, AppError> {
    Ok(Json(store.cancel(id).await?))
}
