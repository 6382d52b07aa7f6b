//! # Habico Core Library
//!
//! This library provides the core logic for Habico, a habit-breaking
//! companion. The user logs the moments they resisted an urge or gave in,
//! a rock mascot gets cleaner or muddier with their progress, and an AI
//! companion chats with them and points out patterns in their slips.
//! It follows a CLI-first philosophy: every operation is available through
//! the standalone CLI binary over this same library.
//!
//! ## Architecture
//!
//! - **Habit engine**: deterministic state transitions for resist and give-in
//!   actions over an append-only activity log
//! - **Stats**: urge-timing detection and the descriptive summary
//! - **Insights and chat**: trigger policy, quotas and request tracking
//! - **AI**: prompts, the [`AiService`] seam and a Gemini REST client
//! - **Storage**: SQLite key/value documents and TOML configuration
//! - **Wisdom**: shuffled deck of habit-science cards
//!
//! ## Key Components
//!
//! - [`ProgressEngine`]: Resist / give-in rules
//! - [`HabicoApp`]: Loaded session that persists after every action
//! - [`Companion`]: AI requests with fallbacks
//! - [`Database`]: Key/value persistence
//! - [`Config`]: Application configuration management

pub mod account;
pub mod ai;
pub mod app;
pub mod chat;
pub mod error;
pub mod habit;
pub mod insight;
pub mod messages;
pub mod stats;
pub mod storage;
pub mod wisdom;

pub use account::{Plan, User, UserUpdate};
pub use ai::{AiService, Companion, GeminiClient};
pub use app::HabicoApp;
pub use chat::{ChatMessage, ChatRole, ChatSession, ChatUpdate};
pub use error::{AiError, ConfigError, CoreError, StorageError, ValidationError};
pub use habit::{
    Activity, ActivityAction, ActivityLog, GiveInDetails, GiveInOutcome, HabitState,
    ProgressEngine, ResistOutcome, SlipDay,
};
pub use insight::{InsightPolicy, InsightReply, InsightSource, RequestState};
pub use stats::{HabitSummary, UrgeTiming};
pub use storage::{Config, Database, HabitRepository, MemoryStore, StateStore, StorageKey};
