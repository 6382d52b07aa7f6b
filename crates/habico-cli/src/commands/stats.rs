use clap::Subcommand;
use habico_core::ValidationError;

use super::{companion, open_app, print_json, runtime, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Progress and slip summary
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Detected time of day when urges win
    Pattern {
        /// Save the detected timing as your urge timing
        #[arg(long)]
        apply: bool,
    },
    /// Slips per hour of the day
    Clock {
        /// Ask the companion for a one-line headline
        #[arg(long)]
        headline: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: StatsAction) -> CliResult {
    let (config, mut app) = open_app()?;

    match action {
        StatsAction::Summary { json } => {
            let summary = app.summary();
            if json {
                print_json(&summary)?;
            } else {
                println!("Resisted:      {}", summary.resist_count);
                println!("Gave in:       {}", summary.give_in_count);
                println!("Best streak:   {}", summary.best_streak);
                println!(
                    "Top trigger:   {}",
                    summary.top_trigger.as_deref().unwrap_or("-")
                );
                println!(
                    "Top emotion:   {}",
                    summary.top_emotion.as_deref().unwrap_or("-")
                );
                if !summary.recent_triggers.is_empty() {
                    println!("Recent:        {}", summary.recent_triggers.join(", "));
                }
                if summary.rewire_ready {
                    println!("Rewire journey unlocked.");
                }
            }
        }
        StatsAction::Pattern { apply } => {
            match app.detected_urge_timing() {
                Some(timing) => println!("{timing}"),
                None => println!("Not enough data yet."),
            }
            if apply {
                match app.apply_timing_suggestion()? {
                    Some(timing) => println!("Saved urge timing: {timing}"),
                    None => println!("Nothing new to save."),
                }
            } else if let Some(timing) = app.timing_suggestion() {
                println!(
                    "Your saved timing is {}. Run with --apply to switch to {timing}.",
                    app.state().urge_timing.as_deref().unwrap_or("unset")
                );
            }
        }
        StatsAction::Clock { headline, json } => {
            let clock = app.summary().clock;
            let headline = if headline {
                if !app.user().plan.is_paid() {
                    return Err(ValidationError::ProFeature("Habit clock headlines").into());
                }
                let companion = companion(&config)?;
                Some(runtime()?.block_on(app.clock_headline(&companion))?)
            } else {
                None
            };

            if json {
                print_json(&serde_json::json!({
                    "hourly": clock.hourly,
                    "am": clock.am_total(),
                    "pm": clock.pm_total(),
                    "peakHour": clock.peak_hour(),
                    "headline": headline,
                }))?;
                return Ok(());
            }

            if let Some(line) = headline {
                println!("{line}");
                println!();
            }
            let max = clock.hourly.iter().copied().max().unwrap_or(0).max(1);
            for (hour, count) in clock.hourly.iter().enumerate() {
                let bar = "#".repeat((*count as usize * 30).div_ceil(max as usize));
                println!("{hour:02}:00 {bar} {count}");
            }
            println!("AM: {}  PM: {}", clock.am_total(), clock.pm_total());
        }
    }
    Ok(())
}
