//! AI companion: prompts, the service seam and the Gemini client.

mod companion;
pub mod fallback;
mod gemini;
pub mod prompts;
mod traits;

pub use companion::{Companion, ROUTINE_SUGGESTION_COUNT};
pub use gemini::GeminiClient;
pub use traits::AiService;
