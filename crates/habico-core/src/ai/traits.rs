use async_trait::async_trait;

use crate::chat::{ChatMessage, ChatUpdate};
use crate::error::AiError;

/// A text-generation backend.
///
/// Implementations report failures as [`AiError`]; picking a fallback is
/// left to [`Companion`](super::Companion).
#[async_trait]
pub trait AiService: Send + Sync {
    /// Stream a reply to `history`, calling `on_update` for each text chunk
    /// and at most once with grounding sources.
    async fn stream_chat(
        &self,
        system_instruction: &str,
        history: &[ChatMessage],
        on_update: &mut (dyn FnMut(ChatUpdate) + Send),
    ) -> Result<(), AiError>;

    /// One-shot plain text completion.
    async fn generate_text(&self, prompt: &str) -> Result<String, AiError>;

    /// One-shot completion constrained to a list of strings.
    async fn generate_list(&self, prompt: &str) -> Result<Vec<String>, AiError>;
}
