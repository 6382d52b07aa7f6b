//! Habit tracking core: the activity log, the persisted aggregate and the
//! progress rules that move it.

mod activity;
mod details;
mod engine;
mod state;

pub use activity::{Activity, ActivityAction, ActivityLog};
pub use details::{GiveInDetails, SlipDay, EMOTIONS};
pub use engine::{GiveInOutcome, ProgressEngine, ResistOutcome};
pub use state::{AiInsight, HabitState, GREETING, MAX_LEVEL};
