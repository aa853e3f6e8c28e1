use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{ChatMessage, ConversationError, ConversationReply, ConversationSnapshot};
use crate::services::engine::Conversation;

/// In-memory conversation sessions keyed by id.
#[derive(Clone, Default)]
pub struct ConversationStore {
    sessions: Arc<RwLock<HashMap<Uuid, Conversation>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> ConversationSnapshot {
        let conversation = Conversation::start();
        let snapshot = conversation.snapshot();

        self.sessions.write().await.insert(conversation.id(), conversation);
        debug!("Conversation {} started", snapshot.id);

        snapshot
    }

    pub async fn get(&self, id: Uuid) -> Result<ConversationSnapshot, ConversationError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(Conversation::snapshot)
            .ok_or(ConversationError::NotFound(id))
    }

    pub async fn select(&self, id: Uuid, value: &str) -> Result<ConversationReply, ConversationError> {
        self.apply(id, |conversation| conversation.select(value).map(<[_]>::to_vec)).await
    }

    pub async fn send_text(&self, id: Uuid, text: &str) -> Result<ConversationReply, ConversationError> {
        self.apply(id, |conversation| conversation.send_text(text).map(<[_]>::to_vec)).await
    }

    pub async fn restart(&self, id: Uuid) -> Result<ConversationReply, ConversationError> {
        self.apply(id, |conversation| Ok(conversation.restart().to_vec())).await
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), ConversationError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(ConversationError::NotFound(id))
    }

    /// Drop sessions idle for longer than `max_idle`. Returns how many were removed.
    pub async fn purge_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, conversation| conversation.updated_at() >= cutoff);

        let removed = before - sessions.len();
        if removed > 0 {
            info!("Purged {} idle conversations", removed);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn apply<F>(&self, id: Uuid, action: F) -> Result<ConversationReply, ConversationError>
    where
        F: FnOnce(&mut Conversation) -> Result<Vec<ChatMessage>, ConversationError>,
    {
        let mut sessions = self.sessions.write().await;
        let conversation = sessions.get_mut(&id).ok_or(ConversationError::NotFound(id))?;

        let messages = action(conversation)?;
        Ok(ConversationReply {
            messages,
            conversation: conversation.snapshot(),
        })
    }
}
