use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    ChatMessage, ChatOption, ConversationError, ConversationSnapshot, FlowKind, Mode, Outcome,
};
use crate::services::flows::{
    Answers, OptionDef, StepDef, COMPLETE_OPTIONS, GREETING, GREETING_OPTIONS,
};
use crate::services::insurers::free_text_reply;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Greeting,
    Asking { flow: FlowKind, step: usize },
    Complete { flow: FlowKind, outcome: Outcome },
}

/// A single guided conversation: the current stage, the answers given so far
/// and an append-only transcript.
#[derive(Debug, Clone)]
pub struct Conversation {
    id: Uuid,
    stage: Stage,
    answers: Answers,
    transcript: Vec<ChatMessage>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn to_options(defs: &[OptionDef]) -> Vec<ChatOption> {
    defs.iter().map(OptionDef::to_option).collect()
}

fn question(step: &StepDef) -> ChatMessage {
    ChatMessage::bot(step.prompt, to_options(step.options))
}

impl Conversation {
    pub fn start() -> Self {
        let now = Utc::now();
        let mut conversation = Self {
            id: Uuid::new_v4(),
            stage: Stage::Greeting,
            answers: Answers::new(),
            transcript: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        conversation.push(ChatMessage::bot(GREETING, to_options(GREETING_OPTIONS)));
        conversation
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn mode(&self) -> Mode {
        match self.stage {
            Stage::Greeting => Mode::None,
            Stage::Asking { flow, .. } | Stage::Complete { flow, .. } => flow.into(),
        }
    }

    pub fn step(&self) -> Option<usize> {
        match self.stage {
            Stage::Asking { step, .. } => Some(step),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.stage {
            Stage::Complete { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Options the caller may select right now.
    pub fn current_options(&self) -> &'static [OptionDef] {
        match self.stage {
            Stage::Greeting => GREETING_OPTIONS,
            Stage::Asking { flow, step } => flow.steps()[step].options,
            Stage::Complete { .. } => COMPLETE_OPTIONS,
        }
    }

    /// Apply a selection and return the messages it appended.
    ///
    /// A value outside the current option set leaves the state untouched.
    pub fn select(&mut self, value: &str) -> Result<&[ChatMessage], ConversationError> {
        let options = self.current_options();
        let invalid = || ConversationError::InvalidOption {
            value: value.to_string(),
            expected: options.iter().map(|o| o.value.to_string()).collect(),
        };
        let chosen = options
            .iter()
            .find(|option| option.value == value)
            .ok_or_else(invalid)?;
        let entered_flow = match self.stage {
            Stage::Greeting => Some(FlowKind::from_greeting_option(chosen.value).ok_or_else(invalid)?),
            _ => None,
        };

        let first_new = self.transcript.len();
        self.push(ChatMessage::user(chosen.label));

        match (self.stage, entered_flow) {
            (Stage::Greeting, Some(flow)) => {
                debug!("Conversation {} entering {:?} flow", self.id, flow);
                self.stage = Stage::Asking { flow, step: 0 };
                self.push(question(&flow.steps()[0]));
            }
            (Stage::Asking { flow, step }, _) => {
                self.answers.insert(step, chosen.value.to_string());
                let steps = flow.steps();

                if step + 1 < steps.len() {
                    self.stage = Stage::Asking { flow, step: step + 1 };
                    self.push(question(&steps[step + 1]));
                } else {
                    let outcome = flow.analyze(&self.answers);
                    debug!("Conversation {} completed with {:?}", self.id, outcome);
                    self.stage = Stage::Complete { flow, outcome };
                    self.push(ChatMessage::bot(outcome.message(), to_options(COMPLETE_OPTIONS)));
                }
            }
            // Only the restart option is offered once a flow is complete.
            (Stage::Complete { .. }, _) | (Stage::Greeting, None) => {
                self.reset();
            }
        }

        Ok(&self.transcript[first_new..])
    }

    /// Free-text question about an insurer. Never moves the flow.
    pub fn send_text(&mut self, text: &str) -> Result<&[ChatMessage], ConversationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ConversationError::EmptyMessage);
        }

        let first_new = self.transcript.len();
        self.push(ChatMessage::user(text));
        self.push(ChatMessage::bot(free_text_reply(text), Vec::new()));

        Ok(&self.transcript[first_new..])
    }

    /// Back to the greeting. Earlier transcript turns stay in place.
    pub fn restart(&mut self) -> &[ChatMessage] {
        let first_new = self.transcript.len();
        self.reset();
        &self.transcript[first_new..]
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            id: self.id,
            mode: self.mode(),
            step: self.step(),
            is_complete: matches!(self.stage, Stage::Complete { .. }),
            outcome: self.outcome(),
            options: to_options(self.current_options()),
            transcript: self.transcript.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn reset(&mut self) {
        self.stage = Stage::Greeting;
        self.answers.clear();
        self.push(ChatMessage::bot(GREETING, to_options(GREETING_OPTIONS)));
    }

    fn push(&mut self, message: ChatMessage) {
        self.updated_at = message.created_at;
        self.transcript.push(message);
    }
}
