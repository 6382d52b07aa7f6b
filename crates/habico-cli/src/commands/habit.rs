use chrono::{Local, NaiveTime};
use clap::builder::PossibleValuesParser;
use clap::{Subcommand, ValueEnum};
use habico_core::habit::{EMOTIONS, MAX_LEVEL};
use habico_core::messages::RockMood;
use habico_core::{ActivityAction, GiveInDetails, ResistOutcome, SlipDay};
use serde_json::json;

use super::{insight, now_ms, open_app, print_json, CliResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum When {
    Today,
    Yesterday,
}

impl From<When> for SlipDay {
    fn from(when: When) -> Self {
        match when {
            When::Today => SlipDay::Today,
            When::Yesterday => SlipDay::Yesterday,
        }
    }
}

#[derive(Subcommand)]
pub enum HabitAction {
    /// Log a resisted urge (counts once per day)
    Resist {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log a slip
    GiveIn {
        /// How you felt
        #[arg(long, value_parser = PossibleValuesParser::new(EMOTIONS))]
        emotion: String,
        /// What set it off
        #[arg(long)]
        trigger: String,
        /// Day the slip happened
        #[arg(long, value_enum, default_value = "today")]
        when: When,
        /// Local clock time (HH:MM); defaults to now
        #[arg(long)]
        at: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show progress
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show logged actions, newest last
    Log {
        /// Only the most recent N entries
        #[arg(long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save the habit you're breaking and when urges hit
    Personalize {
        /// Habit label (e.g. "Vaping")
        #[arg(long)]
        habit: Option<String>,
        /// Urge timing label (e.g. "Evening / Night")
        #[arg(long)]
        timing: Option<String>,
    },
    /// Wipe all progress and start over
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: HabitAction) -> CliResult {
    let (config, mut app) = open_app()?;
    let mut rng = rand::thread_rng();

    match action {
        HabitAction::Resist { json } => {
            let outcome = app.resist(now_ms());
            let reaction = match outcome {
                ResistOutcome::Credited { .. } => {
                    app.reaction(&mut rng, ActivityAction::Resist, false)
                }
                ResistOutcome::AlreadyCreditedToday => None,
            };
            if json {
                print_json(&json!({
                    "outcome": outcome,
                    "day": app.state().day,
                    "streak": app.state().streak,
                    "rockCleanliness": app.state().rock_cleanliness,
                    "reaction": reaction,
                }))?;
            } else {
                match outcome {
                    ResistOutcome::Credited { streak, .. } => {
                        println!("Resisted. Streak: {streak} day(s).");
                    }
                    ResistOutcome::AlreadyCreditedToday => {
                        println!("Already counted today. Come back tomorrow.");
                    }
                }
                if let Some(line) = reaction {
                    println!("Habico: {line}");
                }
            }
        }
        HabitAction::GiveIn {
            emotion,
            trigger,
            when,
            at,
            json,
        } => {
            let time = at
                .as_deref()
                .map(|s| NaiveTime::parse_from_str(s, "%H:%M"))
                .transpose()
                .map_err(|e| format!("--at expects HH:MM: {e}"))?;
            let now = Local::now();
            let details = GiveInDetails::at_local(emotion, &trigger, when.into(), time, &now)
                .ok_or("that clock time does not exist on the chosen day")?;
            let outcome = app.give_in(details, now.timestamp_millis())?;
            let reaction = app.reaction(&mut rng, ActivityAction::GiveIn, outcome.streak_broken);

            if json {
                print_json(&json!({
                    "outcome": outcome,
                    "day": app.state().day,
                    "rockCleanliness": app.state().rock_cleanliness,
                    "reaction": reaction,
                }))?;
            } else {
                println!("Logged. Day {} / {MAX_LEVEL}.", app.state().day);
                if let Some(line) = reaction {
                    println!("Habico: {line}");
                }
            }
            insight::refresh_if_due(&config, &mut app, json)?;
        }
        HabitAction::Status { json } => {
            let state = app.state();
            let mood = RockMood::from_cleanliness(state.rock_cleanliness);
            if json {
                print_json(&json!({
                    "day": state.day,
                    "streak": state.streak,
                    "bestStreak": state.best_streak,
                    "rockCleanliness": state.rock_cleanliness,
                    "mood": mood.label(),
                    "lastUpdate": state.last_update,
                    "giveInsSinceLastInsight": state.give_ins_since_last_insight,
                    "habitType": state.habit_type,
                    "urgeTiming": state.urge_timing,
                    "plan": app.user().plan,
                }))?;
            } else {
                println!("Habit:       {}", state.habit_label());
                println!("Day:         {} / {MAX_LEVEL}", state.day);
                println!("Streak:      {} (best {})", state.streak, state.best_streak);
                println!(
                    "Rock:        {} / {MAX_LEVEL} ({})",
                    state.rock_cleanliness,
                    mood.label()
                );
                if let Some(line) = app.ambient_message(&mut rng) {
                    println!();
                    println!("{line}");
                }
            }
        }
        HabitAction::Log { limit, json } => {
            let entries = app.state().activity_log.as_slice();
            let start = limit.map_or(0, |n| entries.len().saturating_sub(n));
            let entries = &entries[start..];
            if json {
                print_json(&entries)?;
            } else if entries.is_empty() {
                println!("Nothing logged yet.");
            } else {
                for entry in entries {
                    let when = chrono::DateTime::from_timestamp_millis(entry.timestamp)
                        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default();
                    match entry.action {
                        ActivityAction::Resist => println!("{when}  resisted"),
                        ActivityAction::GiveIn => println!(
                            "{when}  gave in ({}, {})",
                            entry.emotion.as_deref().unwrap_or("-"),
                            entry.trigger.as_deref().unwrap_or("-")
                        ),
                    }
                }
            }
        }
        HabitAction::Personalize { habit, timing } => {
            app.personalize(habit.as_deref(), timing.as_deref());
            println!("Saved. Breaking: {}", app.state().habit_label());
        }
        HabitAction::Reset { yes } => {
            if !yes {
                return Err("refusing to reset without --yes".into());
            }
            app.reset(now_ms());
            println!("Progress reset.");
        }
    }
    Ok(())
}
