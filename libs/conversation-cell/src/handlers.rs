use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{ConversationReply, ConversationSnapshot, SelectOptionRequest, SendMessageRequest};
use crate::services::ConversationStore;

#[derive(Clone)]
pub struct ConversationState {
    pub config: Arc<AppConfig>,
    pub store: ConversationStore,
}

impl ConversationState {
    // Simulated "typing" pause before the bot's reply reaches the client.
    async fn reply_delay(&self) {
        let delay = self.config.conversation_reply_delay_ms;
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}

#[axum::debug_handler]
pub async fn start_conversation(
    State(state): State<ConversationState>,
) -> (StatusCode, Json<ConversationSnapshot>) {
    let snapshot = state.store.create().await;
    (StatusCode::CREATED, Json(snapshot))
}

#[axum::debug_handler]
pub async fn get_conversation(
    State(state): State<ConversationState>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<ConversationSnapshot>, AppError> {
    let snapshot = state.store.get(conversation_id).await?;
    Ok(Json(snapshot))
}

#[axum::debug_handler]
pub async fn select_option(
    State(state): State<ConversationState>,
    Path(conversation_id): Path<Uuid>,
    Json(request): Json<SelectOptionRequest>,
) -> Result<Json<ConversationReply>, AppError> {
    let reply = state.store.select(conversation_id, &request.value).await?;
    state.reply_delay().await;
    Ok(Json(reply))
}

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<ConversationState>,
    Path(conversation_id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<ConversationReply>, AppError> {
    let reply = state.store.send_text(conversation_id, &request.text).await?;
    state.reply_delay().await;
    Ok(Json(reply))
}

#[axum::debug_handler]
pub async fn restart_conversation(
    State(state): State<ConversationState>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<ConversationReply>, AppError> {
    let reply = state.store.restart(conversation_id).await?;
    Ok(Json(reply))
}

#[axum::debug_handler]
pub async fn delete_conversation(
    State(state): State<ConversationState>,
    Path(conversation_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.store.remove(conversation_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
