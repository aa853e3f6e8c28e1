use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::ReferralStore;

pub fn referral_routes(config: Arc<AppConfig>, store: ReferralStore) -> Router {
    Router::new()
        .route("/", get(handlers::list_referrals).post(handlers::create_referral))
        .route("/{id}", get(handlers::get_referral))
        .route("/{id}/advance", post(handlers::advance_referral))
        .route("/{id}/cancel", post(handlers::cancel_referral))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(store)
}
