//! Application session: state loaded once, mutated by user actions and
//! written back whole after each one.
//!
//! This is the layer a shell (the CLI, a GUI) talks to. It owns the
//! repository, the progress engine and the request trackers, and applies
//! the plan gates around the pro features.

use chrono::{Local, TimeZone};
use rand::Rng;
use tracing::debug;

use crate::account::{User, UserUpdate};
use crate::ai::{AiService, Companion};
use crate::chat::{ChatSession, ChatUpdate};
use crate::error::ValidationError;
use crate::habit::{
    ActivityAction, GiveInDetails, GiveInOutcome, HabitState, ProgressEngine, ResistOutcome,
};
use crate::insight::{InsightPolicy, InsightReply};
use crate::messages;
use crate::stats::{self, HabitSummary, UrgeTiming};
use crate::storage::{Config, HabitRepository, StateStore, StorageKey};

pub struct HabicoApp<S: StateStore, Tz: TimeZone = Local> {
    repo: HabitRepository<S>,
    engine: ProgressEngine<Tz>,
    insights: InsightPolicy,
    chat: ChatSession,
    rock_messages: bool,
    ambient_messages: bool,
    state: HabitState,
    user: User,
}

impl<S: StateStore> HabicoApp<S, Local> {
    /// Load the session from `store` in the local time zone.
    pub fn load(store: S, config: &Config, now_ms: i64) -> Self {
        Self::load_in(store, config, Local, now_ms)
    }
}

impl<S: StateStore, Tz: TimeZone> HabicoApp<S, Tz> {
    pub fn load_in(store: S, config: &Config, tz: Tz, now_ms: i64) -> Self {
        let repo = HabitRepository::new(store);
        let state = repo.load_habit(now_ms);
        let user = repo.load_user();
        debug!(day = state.day, plan = %user.plan, "session loaded");
        Self {
            repo,
            engine: ProgressEngine::with_timezone(tz),
            insights: InsightPolicy::new(config.insights.threshold),
            chat: ChatSession::new(config.chat_quota()),
            rock_messages: config.display.rock_messages,
            ambient_messages: config.display.ambient_messages,
            state,
            user,
        }
    }

    pub fn state(&self) -> &HabitState {
        &self.state
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn engine(&self) -> &ProgressEngine<Tz> {
        &self.engine
    }

    pub fn repository(&self) -> &HabitRepository<S> {
        &self.repo
    }

    pub fn insight_policy(&self) -> &InsightPolicy {
        &self.insights
    }

    fn persist(&self) -> bool {
        self.repo.save_habit(&self.state)
    }

    pub fn resist(&mut self, now_ms: i64) -> ResistOutcome {
        let outcome = self.engine.apply_resist(&mut self.state, now_ms);
        if outcome.is_credited() {
            self.persist();
        }
        outcome
    }

    /// Log a slip. The details are checked here, before the engine sees them.
    pub fn give_in(
        &mut self,
        details: GiveInDetails,
        now_ms: i64,
    ) -> Result<GiveInOutcome, ValidationError> {
        details.validate()?;
        let outcome = self.engine.apply_give_in(&mut self.state, details, now_ms);
        self.persist();
        Ok(outcome)
    }

    /// Finish onboarding: store the labels and mark it complete.
    pub fn personalize(&mut self, habit_type: Option<&str>, urge_timing: Option<&str>) {
        self.engine
            .save_personalization(&mut self.state, habit_type, urge_timing);
        self.persist();
        self.repo.set_flag(StorageKey::OnboardingComplete, true);
    }

    pub fn onboarding_complete(&self) -> bool {
        self.repo.flag(StorageKey::OnboardingComplete)
    }

    pub fn reset(&mut self, now_ms: i64) {
        self.engine.reset(&mut self.state, now_ms);
        self.insights.cancel();
        self.chat.cancel();
        self.persist();
    }

    pub fn summary(&self) -> HabitSummary {
        stats::summarize_in(&self.state, self.engine.timezone())
    }

    pub fn detected_urge_timing(&self) -> Option<UrgeTiming> {
        stats::analyze_urge_timings_in(
            &self.state.activity_log.give_in_timestamps(),
            self.engine.timezone(),
        )
    }

    /// A detected urge timing worth offering to the user: paid plans only,
    /// and only when it differs from the saved label.
    pub fn timing_suggestion(&self) -> Option<UrgeTiming> {
        if !self.user.plan.is_paid() {
            return None;
        }
        let detected = self.detected_urge_timing()?;
        (self.state.urge_timing.as_deref() != Some(detected.label())).then_some(detected)
    }

    /// Save the suggested timing as the user's urge timing. `Ok(None)` when
    /// there is nothing new to save.
    pub fn apply_timing_suggestion(&mut self) -> Result<Option<UrgeTiming>, ValidationError> {
        self.require_paid("Timing suggestions")?;
        let Some(timing) = self.timing_suggestion() else {
            return Ok(None);
        };
        self.engine
            .save_personalization(&mut self.state, None, Some(timing.label()));
        self.persist();
        Ok(Some(timing))
    }

    /// An idle line from the rock; paid plans only.
    pub fn ambient_message<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&'static str> {
        if !self.ambient_messages || !self.user.plan.is_paid() {
            return None;
        }
        Some(messages::ambient_message(rng))
    }

    /// The rock's line after an action; paid plans only, and only when
    /// enabled in the display settings.
    pub fn reaction<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        action: ActivityAction,
        streak_broken: bool,
    ) -> Option<String> {
        if !self.rock_messages || !self.user.plan.is_paid() {
            return None;
        }
        Some(messages::reaction_message(
            rng,
            action,
            self.state.rock_cleanliness,
            streak_broken,
            self.state.urge_timing.as_deref(),
        ))
    }

    /// Ask for a new insight if one is due. `None` when nothing was asked.
    pub async fn refresh_insight<A, Z>(
        &mut self,
        companion: &Companion<A, Z>,
        now_ms: i64,
    ) -> Option<InsightReply>
    where
        A: AiService,
        Z: TimeZone,
    {
        let ticket = self.insights.begin(&self.state, self.user.plan)?;
        let reply = companion.insight(&self.state.activity_log).await;
        if self
            .insights
            .complete(&self.engine, &mut self.state, ticket, &reply, now_ms)
        {
            self.persist();
        }
        Some(reply)
    }

    /// Send one chat message and collect the streamed reply.
    ///
    /// `on_update` sees every chunk as it arrives; the stored history is
    /// updated once the stream ends. Returns whether the service answered.
    pub async fn send_chat<A, Z>(
        &mut self,
        companion: &Companion<A, Z>,
        text: &str,
        now_ms: i64,
        on_update: &mut (dyn FnMut(&ChatUpdate) + Send),
    ) -> Result<bool, ValidationError>
    where
        A: AiService,
        Z: TimeZone,
    {
        let (history, ticket) = self
            .chat
            .begin_turn(&mut self.state, self.user.plan, text, now_ms)?;
        // The user's message and the placeholder are stored before the call.
        self.persist();

        let mut updates = Vec::new();
        let answered = companion
            .chat(&history, &self.state, &self.user, &mut |update: ChatUpdate| {
                on_update(&update);
                updates.push(update);
            })
            .await;

        for update in updates {
            self.chat.apply_update(&mut self.state, ticket, update);
        }
        self.chat.finish_turn(ticket, answered);
        self.persist();
        Ok(answered)
    }

    pub fn chat_limit_message(&self) -> Option<String> {
        self.chat.quota().limit_message(&self.state, self.user.plan)
    }

    pub fn disclaimer_seen(&self) -> bool {
        self.repo.flag(StorageKey::ChatDisclaimerSeen)
    }

    pub fn mark_disclaimer_seen(&self) -> bool {
        self.repo.set_flag(StorageKey::ChatDisclaimerSeen, true)
    }

    fn require_paid(&self, feature: &'static str) -> Result<(), ValidationError> {
        if self.user.plan.is_paid() {
            Ok(())
        } else {
            Err(ValidationError::ProFeature(feature))
        }
    }

    pub async fn environment_suggestions<A, Z>(
        &self,
        companion: &Companion<A, Z>,
        trigger: &str,
    ) -> Result<Vec<String>, ValidationError>
    where
        A: AiService,
        Z: TimeZone,
    {
        self.require_paid("Environment suggestions")?;
        Ok(companion
            .environment_suggestions(trigger, self.state.habit_type.as_deref())
            .await)
    }

    pub async fn routine_suggestions<A, Z>(
        &self,
        companion: &Companion<A, Z>,
        trigger: &str,
    ) -> Result<Vec<String>, ValidationError>
    where
        A: AiService,
        Z: TimeZone,
    {
        self.require_paid("Routine suggestions")?;
        Ok(companion
            .routine_suggestions(trigger, self.state.habit_type.as_deref())
            .await)
    }

    pub async fn clock_headline<A, Z>(
        &self,
        companion: &Companion<A, Z>,
    ) -> Result<String, ValidationError>
    where
        A: AiService,
        Z: TimeZone,
    {
        self.require_paid("Habit clock headlines")?;
        Ok(companion
            .clock_headline(&self.state.activity_log.give_in_timestamps())
            .await)
    }

    pub fn update_user(&mut self, update: UserUpdate) -> Result<&User, ValidationError> {
        self.user.apply(update)?;
        self.repo.save_user(&self.user);
        Ok(&self.user)
    }

    /// Logout and account deletion: forget the profile and the habit data.
    pub fn clear_account(&mut self, now_ms: i64) -> bool {
        let cleared = self.repo.clear_account();
        self.state = HabitState::new(now_ms);
        self.user = User::default();
        self.insights.cancel();
        self.chat.cancel();
        cleared
    }
}
