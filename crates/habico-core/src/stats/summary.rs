//! Descriptive summaries of the activity log.
//!
//! Feeds the insights screen: most common trigger and emotion, recently
//! used triggers, and a per-hour slip histogram ("habit clock").

use chrono::{Local, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::urge_timing::{analyze_urge_timings_in, UrgeTiming};
use crate::habit::{Activity, ActivityAction, ActivityLog, HabitState};

/// Annotated slips needed before the rewire journey opens.
pub const REWIRE_MIN_TRIGGERS: usize = 3;
/// Recent distinct triggers offered as quick picks.
pub const RECENT_TRIGGER_LIMIT: usize = 3;

/// Slip counts per local hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitClock {
    pub hourly: [u32; 24],
}

impl HabitClock {
    pub fn am_total(&self) -> u32 {
        self.hourly[..12].iter().sum()
    }

    pub fn pm_total(&self) -> u32 {
        self.hourly[12..].iter().sum()
    }

    /// Busiest hour, earliest on ties; `None` when empty.
    pub fn peak_hour(&self) -> Option<u32> {
        let max = *self.hourly.iter().max()?;
        if max == 0 {
            return None;
        }
        self.hourly.iter().position(|&c| c == max).map(|h| h as u32)
    }
}

/// Everything the insights view needs in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitSummary {
    pub day: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub rock_cleanliness: u32,
    pub resist_count: usize,
    pub give_in_count: usize,
    pub top_trigger: Option<String>,
    pub top_emotion: Option<String>,
    pub recent_triggers: Vec<String>,
    pub detected_timing: Option<UrgeTiming>,
    pub rewire_ready: bool,
    pub clock: HabitClock,
}

/// Summarize using the local time zone.
pub fn summarize(state: &HabitState) -> HabitSummary {
    summarize_in(state, &Local)
}

pub fn summarize_in<Tz: TimeZone>(state: &HabitState, tz: &Tz) -> HabitSummary {
    let log = &state.activity_log;
    HabitSummary {
        day: state.day,
        streak: state.streak,
        best_streak: state.best_streak,
        rock_cleanliness: state.rock_cleanliness,
        resist_count: log.count(ActivityAction::Resist),
        give_in_count: log.count(ActivityAction::GiveIn),
        top_trigger: top_trigger(log),
        top_emotion: top_emotion(log),
        recent_triggers: recent_triggers(log, RECENT_TRIGGER_LIMIT),
        detected_timing: analyze_urge_timings_in(&log.give_in_timestamps(), tz),
        rewire_ready: rewire_ready(log),
        clock: habit_clock_in(log, tz),
    }
}

pub fn top_trigger(log: &ActivityLog) -> Option<String> {
    top_label(log, |a| a.trigger.as_deref())
}

pub fn top_emotion(log: &ActivityLog) -> Option<String> {
    top_label(log, |a| a.emotion.as_deref())
}

/// Most frequent label among give-ins; first seen wins a tie.
fn top_label<'a>(
    log: &'a ActivityLog,
    field: impl Fn(&'a Activity) -> Option<&'a str>,
) -> Option<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (order, label) in log
        .give_ins()
        .filter_map(&field)
        .filter(|l| !l.is_empty())
        .enumerate()
    {
        counts.entry(label).or_insert((0, order)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (ca, oa)), (_, (cb, ob))| ca.cmp(cb).then(ob.cmp(oa)))
        .map(|(label, _)| label.to_string())
}

/// Up to `limit` distinct triggers, most recently introduced first.
pub fn recent_triggers(log: &ActivityLog, limit: usize) -> Vec<String> {
    let mut unique: Vec<&str> = Vec::new();
    for trigger in log.iter().filter_map(|a| a.trigger.as_deref()) {
        if !trigger.is_empty() && !unique.contains(&trigger) {
            unique.push(trigger);
        }
    }
    unique
        .iter()
        .rev()
        .take(limit)
        .map(|t| t.to_string())
        .collect()
}

pub fn rewire_ready(log: &ActivityLog) -> bool {
    log.give_ins()
        .filter(|a| a.trigger.as_deref().is_some_and(|t| !t.is_empty()))
        .count()
        >= REWIRE_MIN_TRIGGERS
}

pub fn habit_clock_in<Tz: TimeZone>(log: &ActivityLog, tz: &Tz) -> HabitClock {
    let mut hourly = [0u32; 24];
    for activity in log.give_ins() {
        if let Some(dt) = tz.timestamp_millis_opt(activity.timestamp).single() {
            hourly[dt.hour() as usize] += 1;
        }
    }
    HabitClock { hourly }
}
