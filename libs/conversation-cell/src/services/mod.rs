pub mod engine;
pub mod flows;
pub mod insurers;
pub mod store;

pub use engine::{Conversation, Stage};
pub use store::ConversationStore;
