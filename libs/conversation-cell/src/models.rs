use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Bot,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatOption {
    pub value: String,
    pub label: String,
}

/// One transcript turn. Never mutated once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChatOption>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn bot(text: impl Into<String>, options: Vec<ChatOption>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::Bot,
            text: text.into(),
            options,
            created_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::User,
            text: text.into(),
            options: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    None,
    Symptom,
    Insurance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    Symptom,
    Insurance,
}

impl From<FlowKind> for Mode {
    fn from(flow: FlowKind) -> Self {
        match flow {
            FlowKind::Symptom => Mode::Symptom,
            FlowKind::Insurance => Mode::Insurance,
        }
    }
}

/// Terminal recommendation of a flow. Each variant maps to one fixed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    UrgentCare,
    PrimaryCareVisit,
    HomeCare,
    Covered,
    ReferralRequired,
    EmergencyCovered,
    SelfPay,
}

impl Outcome {
    pub const ALL: [Outcome; 7] = [
        Outcome::UrgentCare,
        Outcome::PrimaryCareVisit,
        Outcome::HomeCare,
        Outcome::Covered,
        Outcome::ReferralRequired,
        Outcome::EmergencyCovered,
        Outcome::SelfPay,
    ];

    pub fn message(&self) -> &'static str {
        match self {
            Outcome::UrgentCare => "Based on your answers, please seek medical attention right away. \
                Go to the nearest emergency department or urgent care center, or call emergency services \
                if your symptoms get worse.",
            Outcome::PrimaryCareVisit => "Based on your answers, we recommend booking an appointment with \
                your primary care physician in the next few days. They can examine you and refer you to a \
                specialist if needed.",
            Outcome::HomeCare => "Based on your answers, your symptoms appear manageable at home. Rest, stay \
                hydrated and monitor how you feel. Contact your primary care physician if symptoms persist \
                or get worse.",
            Outcome::Covered => "Good news: this type of care is typically covered by your plan with in-network \
                providers. Your usual copay or coinsurance applies.",
            Outcome::ReferralRequired => "Your plan typically requires a referral from your primary care \
                physician before you see a specialist. Ask your PCP to submit a referral so the visit is covered.",
            Outcome::EmergencyCovered => "Emergency care is covered by your plan, in or out of network. In an \
                emergency, go to the nearest emergency department without waiting for authorization.",
            Outcome::SelfPay => "Without insurance you can still be seen as a self-pay patient. Ask our billing \
                team about self-pay rates and payment plans before your visit.",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationSnapshot {
    pub id: Uuid,
    pub mode: Mode,
    pub step: Option<usize>,
    pub is_complete: bool,
    pub outcome: Option<Outcome>,
    pub options: Vec<ChatOption>,
    pub transcript: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Messages appended by one action plus the resulting state.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationReply {
    pub messages: Vec<ChatMessage>,
    pub conversation: ConversationSnapshot,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectOptionRequest {
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Error, Debug, PartialEq)]
pub enum ConversationError {
    #[error("'{value}' is not an option at this step (expected one of: {})", .expected.join(", "))]
    InvalidOption { value: String, expected: Vec<String> },

    #[error("Message text must not be empty")]
    EmptyMessage,

    #[error("Conversation not found: {0}")]
    NotFound(Uuid),
}

impl From<ConversationError> for AppError {
    fn from(err: ConversationError) -> Self {
        match err {
            ConversationError::InvalidOption { .. } => AppError::BadRequest(err.to_string()),
            ConversationError::EmptyMessage => AppError::ValidationError(err.to_string()),
            ConversationError::NotFound(_) => AppError::NotFound(err.to_string()),
        }
    }
}
