use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use shared_config::AppConfig;

use crate::handlers::{self, ConversationState};
use crate::services::ConversationStore;

pub fn conversation_routes(config: Arc<AppConfig>, store: ConversationStore) -> Router {
    let state = ConversationState { config, store };

    Router::new()
        .route("/", post(handlers::start_conversation))
        .route("/{conversation_id}", get(handlers::get_conversation).delete(handlers::delete_conversation))
        .route("/{conversation_id}/select", post(handlers::select_option))
        .route("/{conversation_id}/message", post(handlers::send_message))
        .route("/{conversation_id}/restart", post(handlers::restart_conversation))
        .with_state(state)
}
