//! Statistics module for Habico
//!
//! Pure analysis over the activity log: urge timing detection and the
//! descriptive summary shown on the insights screen.

mod summary;
mod urge_timing;

pub use summary::{
    habit_clock_in, recent_triggers, rewire_ready, summarize, summarize_in, top_emotion,
    top_trigger, HabitClock, HabitSummary, RECENT_TRIGGER_LIMIT, REWIRE_MIN_TRIGGERS,
};

pub use urge_timing::{
    analyze_urge_timings, analyze_urge_timings_in, classify_hours, TimeOfDay, UrgeTiming,
    DOMINANCE_RATIO, MINIMUM_SHARE, MIN_SAMPLES,
};
