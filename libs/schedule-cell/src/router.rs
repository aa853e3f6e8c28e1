use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::AvailabilityStore;

// Every schedule route acts on the calendar of the authenticated specialist.
pub fn schedule_routes(config: Arc<AppConfig>, store: AvailabilityStore) -> Router {
    Router::new()
        .route("/", get(handlers::get_week))
        .route("/{date}", get(handlers::get_day))
        .route("/{date}/toggle", post(handlers::toggle_day))
        .route("/{date}/slots", post(handlers::add_slot))
        .route("/{date}/slots/{slot_id}", delete(handlers::remove_slot))
        .route("/{date}/slots/{slot_id}/toggle", post(handlers::toggle_slot))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(store)
}
