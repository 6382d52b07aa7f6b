//! Conversation with the companion: messages, quota and streamed replies.

mod message;
mod session;

pub use message::{ChatCount, ChatMessage, ChatRole, ChatUpdate, GroundingSource};
pub use session::{ChatQuota, ChatSession};
