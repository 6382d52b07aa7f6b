//! The companion: every AI request the app makes, with fallbacks.
//!
//! Service failures never reach the caller. They are logged and replaced
//! with a canned reply so the shell always has something to show.

use chrono::{Local, TimeZone};
use tracing::warn;

use super::fallback;
use super::prompts;
use super::traits::AiService;
use crate::account::User;
use crate::chat::{ChatMessage, ChatUpdate};
use crate::habit::{ActivityLog, HabitState};
use crate::insight::{InsightReply, InsightSource};

/// Suggestions returned by the routine request.
pub const ROUTINE_SUGGESTION_COUNT: usize = 3;

pub struct Companion<S: AiService, Tz: TimeZone = Local> {
    service: S,
    tz: Tz,
}

impl<S: AiService> Companion<S, Local> {
    pub fn new(service: S) -> Self {
        Self::with_timezone(service, Local)
    }
}

impl<S: AiService, Tz: TimeZone> Companion<S, Tz> {
    pub fn with_timezone(service: S, tz: Tz) -> Self {
        Self { service, tz }
    }

    /// Stream a chat reply. On failure a fallback chunk is emitted and
    /// `false` is returned.
    pub async fn chat(
        &self,
        history: &[ChatMessage],
        state: &HabitState,
        user: &User,
        on_update: &mut (dyn FnMut(ChatUpdate) + Send),
    ) -> bool {
        let instruction = prompts::system_instruction(state, user);
        match self
            .service
            .stream_chat(&instruction, history, &mut *on_update)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "chat reply failed");
                on_update(ChatUpdate::text(fallback::CHAT_UNAVAILABLE));
                false
            }
        }
    }

    /// Pattern plus one actionable task, from recent annotated slips.
    pub async fn insight(&self, log: &ActivityLog) -> InsightReply {
        let slips = prompts::recent_slips(log, &self.tz);
        if slips.len() < prompts::INSIGHT_MIN_SLIPS {
            return InsightReply {
                text: fallback::INSIGHT_NOT_ENOUGH_DATA.into(),
                source: InsightSource::NotEnoughData,
            };
        }

        let prompt = prompts::insight_prompt(&slips);
        match self.service.generate_text(&prompt).await {
            Ok(text) => InsightReply {
                text: text.trim().to_string(),
                source: InsightSource::Generated,
            },
            Err(e) => {
                warn!(error = %e, "insight generation failed");
                InsightReply {
                    text: fallback::INSIGHT_UNAVAILABLE.into(),
                    source: InsightSource::Fallback,
                }
            }
        }
    }

    /// Two or three ways to make the habit harder to reach.
    pub async fn environment_suggestions(&self, trigger: &str, habit: Option<&str>) -> Vec<String> {
        let prompt = prompts::environment_prompt(trigger, habit);
        match self.service.generate_list(&prompt).await {
            Ok(list) if !list.is_empty() => list,
            Ok(_) => {
                warn!("environment suggestions came back empty");
                fallback::owned(&fallback::ENVIRONMENT_SUGGESTIONS)
            }
            Err(e) => {
                warn!(error = %e, "environment suggestions failed");
                fallback::owned(&fallback::ENVIRONMENT_SUGGESTIONS)
            }
        }
    }

    /// Exactly three short replacement routines.
    pub async fn routine_suggestions(&self, trigger: &str, habit: Option<&str>) -> Vec<String> {
        let prompt = prompts::routine_prompt(trigger, habit);
        match self.service.generate_list(&prompt).await {
            Ok(mut list) if !list.is_empty() => {
                list.truncate(ROUTINE_SUGGESTION_COUNT);
                list
            }
            Ok(_) => {
                warn!("routine suggestions came back empty");
                fallback::owned(&fallback::ROUTINE_SUGGESTIONS)
            }
            Err(e) => {
                warn!(error = %e, "routine suggestions failed");
                fallback::owned(&fallback::ROUTINE_SUGGESTIONS)
            }
        }
    }

    /// One-line headline about when slips happen.
    pub async fn clock_headline(&self, timestamps: &[i64]) -> String {
        if timestamps.len() < prompts::CLOCK_MIN_SLIPS {
            return fallback::CLOCK_NOT_ENOUGH_DATA.into();
        }
        let hours = prompts::recent_hours(timestamps, &self.tz);
        match self.service.generate_text(&prompts::clock_prompt(&hours)).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "habit clock headline failed");
                fallback::CLOCK_UNAVAILABLE.into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::GroundingSource;
    use crate::error::AiError;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    /// Scripted service: replies with fixed values or fails every call.
    #[derive(Default)]
    struct FakeService {
        fail: bool,
        text: String,
        list: Vec<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeService {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AiService for FakeService {
        async fn stream_chat(
            &self,
            system_instruction: &str,
            _history: &[ChatMessage],
            on_update: &mut (dyn FnMut(ChatUpdate) + Send),
        ) -> Result<(), AiError> {
            self.prompts.lock().unwrap().push(system_instruction.into());
            if self.fail {
                return Err(AiError::Malformed("boom".into()));
            }
            on_update(ChatUpdate::text(self.text.clone()));
            on_update(ChatUpdate::sources(vec![GroundingSource {
                uri: "https://example.org".into(),
                title: "Example".into(),
            }]));
            Ok(())
        }

        async fn generate_text(&self, prompt: &str) -> Result<String, AiError> {
            self.prompts.lock().unwrap().push(prompt.into());
            if self.fail {
                return Err(AiError::MissingApiKey);
            }
            Ok(self.text.clone())
        }

        async fn generate_list(&self, prompt: &str) -> Result<Vec<String>, AiError> {
            self.prompts.lock().unwrap().push(prompt.into());
            if self.fail {
                return Err(AiError::MissingApiKey);
            }
            Ok(self.list.clone())
        }
    }

    fn companion(service: FakeService) -> Companion<FakeService, Utc> {
        Companion::with_timezone(service, Utc)
    }

    fn annotated_log(n: i64) -> ActivityLog {
        let mut log = ActivityLog::new();
        for i in 0..n {
            log.append(crate::habit::Activity::give_in(
                i * 3_600_000,
                "Bored",
                "phone",
            ));
        }
        log
    }

    #[tokio::test]
    async fn insight_needs_three_annotated_slips() {
        let c = companion(FakeService::default());
        let reply = c.insight(&annotated_log(2)).await;
        assert_eq!(reply.source, InsightSource::NotEnoughData);
        assert_eq!(reply.text, fallback::INSIGHT_NOT_ENOUGH_DATA);
        assert_eq!(c.service.calls(), 0);
    }

    #[tokio::test]
    async fn insight_generated() {
        let c = companion(FakeService {
            text: "  Nights are tough. Put the phone away at 10.  ".into(),
            ..FakeService::default()
        });
        let reply = c.insight(&annotated_log(3)).await;
        assert_eq!(reply.source, InsightSource::Generated);
        assert_eq!(reply.text, "Nights are tough. Put the phone away at 10.");
    }

    #[tokio::test]
    async fn insight_failure_is_not_recordable() {
        let c = companion(FakeService::failing());
        let reply = c.insight(&annotated_log(5)).await;
        assert_eq!(reply.text, fallback::INSIGHT_UNAVAILABLE);
        assert!(!reply.is_recordable());
    }

    #[tokio::test]
    async fn routine_suggestions_are_truncated_to_three() {
        let c = companion(FakeService {
            list: (1..=5).map(|i| format!("idea {i}")).collect(),
            ..FakeService::default()
        });
        let list = c.routine_suggestions("stress", Some("Vaping")).await;
        assert_eq!(list, vec!["idea 1", "idea 2", "idea 3"]);
    }

    #[tokio::test]
    async fn suggestions_fall_back_on_empty_or_error() {
        let empty = companion(FakeService::default());
        assert_eq!(
            empty.environment_suggestions("desk", None).await,
            fallback::owned(&fallback::ENVIRONMENT_SUGGESTIONS)
        );
        let broken = companion(FakeService::failing());
        assert_eq!(
            broken.routine_suggestions("desk", None).await,
            fallback::owned(&fallback::ROUTINE_SUGGESTIONS)
        );
    }

    #[tokio::test]
    async fn clock_headline_paths() {
        let c = companion(FakeService {
            text: "Late nights are the tricky spot.\n".into(),
            ..FakeService::default()
        });
        assert_eq!(c.clock_headline(&[1, 2]).await, fallback::CLOCK_NOT_ENOUGH_DATA);
        assert_eq!(
            c.clock_headline(&[1, 2, 3]).await,
            "Late nights are the tricky spot."
        );

        let broken = companion(FakeService::failing());
        assert_eq!(broken.clock_headline(&[1, 2, 3]).await, fallback::CLOCK_UNAVAILABLE);
    }

    #[tokio::test]
    async fn chat_failure_emits_fallback_chunk() {
        let c = companion(FakeService::failing());
        let mut chunks = Vec::new();
        let ok = c
            .chat(
                &[],
                &HabitState::default(),
                &User::default(),
                &mut |u: ChatUpdate| chunks.push(u),
            )
            .await;
        assert!(!ok);
        assert_eq!(chunks, vec![ChatUpdate::text(fallback::CHAT_UNAVAILABLE)]);
    }

    #[tokio::test]
    async fn chat_passes_persona_and_streams() {
        let c = companion(FakeService {
            text: "Well, that happened.".into(),
            ..FakeService::default()
        });
        let mut chunks = Vec::new();
        let user = User {
            name: "Rae".into(),
            ..User::default()
        };
        assert!(
            c.chat(&[], &HabitState::default(), &user, &mut |u: ChatUpdate| chunks.push(u))
                .await
        );
        assert_eq!(chunks.len(), 2);
        assert!(c.service.prompts.lock().unwrap()[0].contains("The user's name is Rae."));
    }
}
