//! Habit progress engine.
//!
//! Deterministic transitions of [`HabitState`] for a single user action.
//! Calendar-day math uses the engine's time zone (the local zone by default)
//! so "today" and "yesterday" match what the user sees on their clock.

use chrono::{Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::activity::Activity;
use super::details::GiveInDetails;
use super::state::{AiInsight, HabitState, MAX_LEVEL};

/// Constants of the progress rules.
#[derive(Debug, Clone)]
struct ProgressConfig {
    /// Ceiling for `day` and `rock_cleanliness`.
    max_level: u32,
    /// Cleanliness lost per give-in.
    give_in_penalty: u32,
    /// One bonus cleanliness point per this many streak days.
    streak_bonus_every: u32,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            max_level: MAX_LEVEL,
            give_in_penalty: 5,
            streak_bonus_every: 5,
        }
    }
}

/// Result of [`ProgressEngine::apply_resist`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResistOutcome {
    /// The resist counted for today.
    Credited {
        streak: u32,
        /// True when yesterday also had a credited action.
        continued: bool,
    },
    /// A resist was already credited today; state is untouched.
    AlreadyCreditedToday,
}

impl ResistOutcome {
    pub fn is_credited(&self) -> bool {
        matches!(self, ResistOutcome::Credited { .. })
    }
}

/// Result of [`ProgressEngine::apply_give_in`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiveInOutcome {
    /// A non-zero streak was lost.
    pub streak_broken: bool,
    pub give_ins_since_last_insight: u32,
}

/// Pure state-transition rules over [`HabitState`].
#[derive(Debug, Clone)]
pub struct ProgressEngine<Tz: TimeZone = Local> {
    config: ProgressConfig,
    tz: Tz,
}

impl ProgressEngine<Local> {
    /// Engine using the local time zone and default rules.
    pub fn new() -> Self {
        Self::with_timezone(Local)
    }
}

impl Default for ProgressEngine<Local> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Tz: TimeZone> ProgressEngine<Tz> {
    pub fn with_timezone(tz: Tz) -> Self {
        Self {
            config: ProgressConfig::default(),
            tz,
        }
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// Calendar date of an epoch-ms instant in the engine's zone.
    pub fn local_date(&self, epoch_ms: i64) -> Option<NaiveDate> {
        self.tz
            .timestamp_millis_opt(epoch_ms)
            .single()
            .map(|dt| dt.date_naive())
    }

    /// Credit a resist at `now_ms`.
    ///
    /// Repeated calls on the same calendar day leave `state` unchanged and
    /// report [`ResistOutcome::AlreadyCreditedToday`].
    pub fn apply_resist(&self, state: &mut HabitState, now_ms: i64) -> ResistOutcome {
        let today = self.local_date(now_ms);
        let last_date = state.last_update.and_then(|ms| self.local_date(ms));

        if last_date.is_some() && last_date == today {
            debug!(now_ms, "resist already credited today");
            return ResistOutcome::AlreadyCreditedToday;
        }

        let yesterday = today.and_then(|d| d.pred_opt());
        let continued = last_date.is_some() && last_date == yesterday;
        let streak = if continued {
            state.streak.saturating_add(1)
        } else {
            1
        };

        let max = self.config.max_level;
        let bonus = match self.config.streak_bonus_every {
            0 => 0,
            every => streak / every,
        };

        state.day = state.day.saturating_add(1).min(max);
        state.streak = streak;
        state.best_streak = state.best_streak.max(streak);
        state.rock_cleanliness = state
            .rock_cleanliness
            .saturating_add(1 + bonus)
            .min(max);
        state.last_update = Some(now_ms);
        state.activity_log.append(Activity::resist(now_ms));

        debug!(
            streak,
            day = state.day,
            cleanliness = state.rock_cleanliness,
            "resist credited"
        );
        ResistOutcome::Credited { streak, continued }
    }

    /// Record a slip.
    ///
    /// The log entry carries `details.timestamp`; `last_update` is set to the
    /// real `now_ms`, so back-dating a slip does not move streak math.
    pub fn apply_give_in(
        &self,
        state: &mut HabitState,
        details: GiveInDetails,
        now_ms: i64,
    ) -> GiveInOutcome {
        let streak_broken = state.streak > 0;

        state.day = state.day.saturating_sub(1);
        state.streak = 0;
        state.rock_cleanliness = state
            .rock_cleanliness
            .saturating_sub(self.config.give_in_penalty);
        state.last_update = Some(now_ms);
        state.activity_log.append(Activity::give_in(
            details.timestamp,
            details.emotion,
            details.trigger,
        ));
        state.give_ins_since_last_insight = state.give_ins_since_last_insight.saturating_add(1);

        debug!(
            day = state.day,
            cleanliness = state.rock_cleanliness,
            pending = state.give_ins_since_last_insight,
            "give-in recorded"
        );
        GiveInOutcome {
            streak_broken,
            give_ins_since_last_insight: state.give_ins_since_last_insight,
        }
    }

    /// Store a generated insight and restart the give-in counter.
    pub fn record_insight(&self, state: &mut HabitState, text: impl Into<String>, now_ms: i64) {
        state.ai_insight = AiInsight {
            text: text.into(),
            generated_at: Some(now_ms),
        };
        state.give_ins_since_last_insight = 0;
    }

    /// Overwrite personalization labels; blank or missing values keep the old ones.
    pub fn save_personalization(
        &self,
        state: &mut HabitState,
        habit_type: Option<&str>,
        urge_timing: Option<&str>,
    ) {
        if let Some(habit) = habit_type.map(str::trim).filter(|h| !h.is_empty()) {
            state.habit_type = Some(habit.to_string());
        }
        if let Some(timing) = urge_timing.map(str::trim).filter(|t| !t.is_empty()) {
            state.urge_timing = Some(timing.to_string());
        }
    }

    /// Reinitialize to first-run defaults.
    pub fn reset(&self, state: &mut HabitState, now_ms: i64) {
        *state = HabitState::new(now_ms);
    }
}
