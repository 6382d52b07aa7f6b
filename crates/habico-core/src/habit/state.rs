//! The persisted habit aggregate.

use serde::{Deserialize, Serialize};

use super::activity::ActivityLog;
use crate::chat::{ChatCount, ChatMessage};

/// Upper bound shared by `day` and `rock_cleanliness`.
pub const MAX_LEVEL: u32 = 90;

/// Opening line of a fresh chat history.
pub const GREETING: &str =
    "I'm Habico. This is our space to talk through the journey. What's on your mind?";

/// Most recent AI-generated insight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInsight {
    pub text: String,
    pub generated_at: Option<i64>,
}

/// Everything the engine owns. Collaborators read and write it whole.
///
/// Serialized with camelCase keys; every field has a default so documents
/// written by older versions (or partially written ones) still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HabitState {
    /// 0..=90
    pub day: u32,
    pub streak: u32,
    /// High-water mark of `streak`.
    pub best_streak: u32,
    /// 0..=90
    pub rock_cleanliness: u32,
    /// Epoch ms of the last state-changing action.
    pub last_update: Option<i64>,
    pub activity_log: ActivityLog,
    pub ai_insight: AiInsight,
    pub give_ins_since_last_insight: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub habit_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urge_timing: Option<String>,
    pub chat_history: Vec<ChatMessage>,
    pub chat_count: ChatCount,
}

impl HabitState {
    /// First-run state: zeroed counters and the companion's greeting.
    pub fn new(now_ms: i64) -> Self {
        Self {
            chat_history: vec![ChatMessage::model(GREETING, now_ms)],
            chat_count: ChatCount::starting(now_ms),
            ..Self::default()
        }
    }

    /// Repair a freshly loaded document: clamp counters and restore the
    /// greeting when no history was stored.
    pub fn normalized(mut self, now_ms: i64) -> Self {
        self.day = self.day.min(MAX_LEVEL);
        self.rock_cleanliness = self.rock_cleanliness.min(MAX_LEVEL);
        self.best_streak = self.best_streak.max(self.streak);
        if self.chat_history.is_empty() {
            self.chat_history.push(ChatMessage::model(GREETING, now_ms));
        }
        if self.chat_count.last_chat_date.is_empty() {
            self.chat_count = ChatCount::starting(now_ms);
        }
        self
    }

    /// Habit label for prompts, with a generic default.
    pub fn habit_label(&self) -> &str {
        self.habit_type
            .as_deref()
            .filter(|h| !h.is_empty())
            .unwrap_or("your habit")
    }
}
