//! Chat bookkeeping over the history stored in [`HabitState`].

use serde::{Deserialize, Serialize};

use super::message::{ChatMessage, ChatRole, ChatUpdate};
use crate::account::Plan;
use crate::error::ValidationError;
use crate::habit::HabitState;
use crate::insight::{RequestState, RequestTracker, RequestTicket};

/// Free-plan message limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatQuota {
    pub daily: u32,
    pub monthly: u32,
}

impl Default for ChatQuota {
    fn default() -> Self {
        Self {
            daily: 3,
            monthly: 30,
        }
    }
}

impl ChatQuota {
    /// Why the user cannot send right now, if they can't.
    pub fn limit_message(&self, state: &HabitState, plan: Plan) -> Option<String> {
        if plan.is_paid() {
            return None;
        }
        let count = &state.chat_count;
        if count.daily >= self.daily {
            Some(format!(
                "You've reached your daily message limit ({}/{}). Upgrade for unlimited chat.",
                count.daily, self.daily
            ))
        } else if count.monthly >= self.monthly {
            Some(format!(
                "You've reached your monthly message limit ({}/{}). Upgrade for unlimited chat.",
                count.monthly, self.monthly
            ))
        } else {
            None
        }
    }
}

/// Drives one user turn: quota, history, streamed reply assembly.
#[derive(Debug, Default)]
pub struct ChatSession {
    quota: ChatQuota,
    tracker: RequestTracker,
}

impl ChatSession {
    pub fn new(quota: ChatQuota) -> Self {
        Self {
            quota,
            tracker: RequestTracker::default(),
        }
    }

    pub fn quota(&self) -> &ChatQuota {
        &self.quota
    }

    pub fn request_state(&self) -> RequestState {
        self.tracker.state()
    }

    /// Append a message, rolling the counters over and counting user turns.
    pub fn add_message(state: &mut HabitState, message: ChatMessage, now_ms: i64) {
        state.chat_count.roll_over(now_ms);
        if message.role == ChatRole::User {
            state.chat_count.daily += 1;
            state.chat_count.monthly += 1;
        }
        state.chat_history.push(message);
    }

    /// Merge a streamed update into the last message.
    pub fn update_last_message(state: &mut HabitState, update: ChatUpdate) {
        let Some(last) = state.chat_history.last_mut() else {
            return;
        };
        if let Some(chunk) = update.text_chunk.filter(|c| !c.is_empty()) {
            last.text.push_str(&chunk);
        }
        if let Some(sources) = update.sources.filter(|s| !s.is_empty()) {
            last.sources = Some(sources);
        }
    }

    /// Record the user's message and an empty model placeholder.
    ///
    /// Returns the history to send (everything up to and including the new
    /// user message) and the ticket for the reply.
    pub fn begin_turn(
        &mut self,
        state: &mut HabitState,
        plan: Plan,
        text: &str,
        now_ms: i64,
    ) -> Result<(Vec<ChatMessage>, RequestTicket), ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyField {
                field: "message".into(),
            });
        }
        // Counters may be stale from an earlier day.
        state.chat_count.roll_over(now_ms);
        if let Some(message) = self.quota.limit_message(state, plan) {
            return Err(ValidationError::ChatLimit(message));
        }
        let ticket = self.tracker.begin().ok_or(ValidationError::Busy("chat"))?;

        let user_message = ChatMessage::user(text, now_ms);
        Self::add_message(state, user_message, now_ms);
        let history = state.chat_history.clone();

        let mut placeholder = ChatMessage::model("", now_ms + 1);
        placeholder.sources = Some(Vec::new());
        Self::add_message(state, placeholder, now_ms);

        Ok((history, ticket))
    }

    /// Apply a streamed update if `ticket` is still the live request.
    pub fn apply_update(&self, state: &mut HabitState, ticket: RequestTicket, update: ChatUpdate) {
        if self.tracker.is_current(ticket) {
            Self::update_last_message(state, update);
        }
    }

    pub fn finish_turn(&mut self, ticket: RequestTicket, succeeded: bool) -> bool {
        self.tracker.finish(ticket, succeeded)
    }

    pub fn cancel(&mut self) {
        self.tracker.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::GroundingSource;

    const NOW: i64 = 1_746_100_800_000; // 2025-05-01T12:00:00Z

    #[test]
    fn free_plan_hits_daily_limit() {
        let mut state = HabitState::new(NOW);
        let mut session = ChatSession::default();
        for i in 0..3 {
            let (_, ticket) = session
                .begin_turn(&mut state, Plan::Free, &format!("msg {i}"), NOW)
                .unwrap();
            session.finish_turn(ticket, true);
        }
        let err = session
            .begin_turn(&mut state, Plan::Free, "one more", NOW)
            .unwrap_err();
        assert!(err.to_string().contains("daily message limit (3/3)"));
    }

    #[test]
    fn paid_plan_is_unlimited() {
        let mut state = HabitState::new(NOW);
        state.chat_count.daily = 50;
        state.chat_count.monthly = 500;
        assert!(ChatQuota::default()
            .limit_message(&state, Plan::Lifetime)
            .is_none());
    }

    #[test]
    fn second_turn_refused_while_in_flight() {
        let mut state = HabitState::new(NOW);
        let mut session = ChatSession::default();
        session
            .begin_turn(&mut state, Plan::Monthly, "hello", NOW)
            .unwrap();
        assert!(matches!(
            session.begin_turn(&mut state, Plan::Monthly, "again", NOW),
            Err(ValidationError::Busy("chat"))
        ));
    }

    #[test]
    fn begin_turn_adds_user_message_and_placeholder() {
        let mut state = HabitState::new(NOW);
        let mut session = ChatSession::default();
        let (history, ticket) = session
            .begin_turn(&mut state, Plan::Free, "  rough day  ", NOW)
            .unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[1].text, "rough day");
        assert_eq!(state.chat_history.len(), 3);
        assert_eq!(state.chat_count.daily, 1);

        session.apply_update(&mut state, ticket, ChatUpdate::text("Well, "));
        session.apply_update(&mut state, ticket, ChatUpdate::text("that happened."));
        session.apply_update(
            &mut state,
            ticket,
            ChatUpdate::sources(vec![GroundingSource {
                uri: "https://example.org".into(),
                title: "Example".into(),
            }]),
        );
        let last = state.chat_history.last().unwrap();
        assert_eq!(last.text, "Well, that happened.");
        assert_eq!(last.sources.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn cancelled_turn_ignores_late_chunks() {
        let mut state = HabitState::new(NOW);
        let mut session = ChatSession::default();
        let (_, ticket) = session
            .begin_turn(&mut state, Plan::Monthly, "hi", NOW)
            .unwrap();
        session.cancel();
        session.apply_update(&mut state, ticket, ChatUpdate::text("late"));
        assert_eq!(state.chat_history.last().unwrap().text, "");
        assert!(!session.finish_turn(ticket, true));
    }

    #[test]
    fn model_messages_do_not_count() {
        let mut state = HabitState::new(NOW);
        ChatSession::add_message(&mut state, ChatMessage::model("hey", NOW), NOW);
        assert_eq!(state.chat_count.daily, 0);
    }
}
