use clap::Subcommand;

use super::{companion, open_app, print_json, runtime, CliResult};

#[derive(Subcommand)]
pub enum SuggestAction {
    /// Ways to make the habit harder to reach
    Environment {
        /// The trigger to design around (defaults to your most common one)
        #[arg(long)]
        trigger: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Short routines to do instead
    Routine {
        /// The trigger to replace (defaults to your most common one)
        #[arg(long)]
        trigger: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: SuggestAction) -> CliResult {
    let (config, app) = open_app()?;
    let (trigger, json, routine) = match action {
        SuggestAction::Environment { trigger, json } => (trigger, json, false),
        SuggestAction::Routine { trigger, json } => (trigger, json, true),
    };
    let trigger = trigger
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| app.summary().top_trigger)
        .ok_or("no trigger given and none logged yet; pass --trigger")?;

    if !app.user().plan.is_paid() {
        let feature = if routine {
            "Routine suggestions"
        } else {
            "Environment suggestions"
        };
        return Err(habico_core::ValidationError::ProFeature(feature).into());
    }

    let companion = companion(&config)?;
    let rt = runtime()?;
    let suggestions = if routine {
        rt.block_on(app.routine_suggestions(&companion, &trigger))?
    } else {
        rt.block_on(app.environment_suggestions(&companion, &trigger))?
    };

    if json {
        print_json(&suggestions)?;
    } else {
        println!("For \"{trigger}\":");
        for suggestion in &suggestions {
            println!("  - {suggestion}");
        }
    }
    Ok(())
}
