use std::sync::Arc;

use axum::{
    extract::{Extension, Json, Query, State},
    http::StatusCode,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::{LoginRequest, LoginResponse, Role, SignupRequest, SignupResponse, User};
use shared_models::error::AppError;
use shared_utils::guard::{resolve_route, RouteDecision};
use shared_utils::jwt::validate_token;

use crate::services::AccountService;

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub path: String,
    pub role: Option<String>,
}

#[axum::debug_handler]
pub async fn signup(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let service = AccountService::new(&config);
    let user = service.signup(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User registered successfully".to_string(),
            user,
        }),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let service = AccountService::new(&config);
    let token = service.login(request).await?;

    Ok(Json(LoginResponse { token }))
}

pub async fn verify_token(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
) -> Json<Value> {
    debug!("Verifying token");

    match validate_token(bearer.token(), &config.jwt_secret) {
        Ok(user) => Json(json!({ "valid": true, "user_id": user.id, "expires_at": user.expires_at })),
        Err(_) => Json(json!({ "valid": false })),
    }
}

pub async fn current_user(
    Extension(user): Extension<User>,
) -> Json<Value> {
    Json(json!({
        "id": user.id,
        "issued_at": user.issued_at,
        "expires_at": user.expires_at,
    }))
}

pub async fn resolve_route_access(
    Query(query): Query<RouteQuery>,
) -> Result<Json<RouteDecision>, AppError> {
    let role = match query.role.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<Role>().map_err(AppError::BadRequest)?),
    };

    Ok(Json(resolve_route(role, &query.path)))
}
