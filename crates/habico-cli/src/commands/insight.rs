use clap::Subcommand;
use habico_core::storage::Database;
use habico_core::{Config, HabicoApp, InsightSource, ValidationError};
use serde_json::json;

use super::{companion, now_ms, open_app, print_json, runtime, CliResult};

#[derive(Subcommand)]
pub enum InsightAction {
    /// Show the latest insight
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask for a new insight if enough slips have been logged
    Refresh {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Request an insight when the policy says one is due. Quietly does
/// nothing otherwise, and when the service cannot be reached.
pub fn refresh_if_due(config: &Config, app: &mut HabicoApp<Database>, json: bool) -> CliResult {
    if !app
        .insight_policy()
        .should_request(app.state(), app.user().plan)
    {
        return Ok(());
    }
    let companion = match companion(config) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "skipping insight refresh");
            return Ok(());
        }
    };
    let reply = runtime()?.block_on(app.refresh_insight(&companion, now_ms()));
    if let Some(reply) = reply.filter(|r| r.source == InsightSource::Generated) {
        if json {
            print_json(&json!({ "insight": reply.text }))?;
        } else {
            println!();
            println!("New insight: {}", reply.text);
        }
    }
    Ok(())
}

pub fn run(action: InsightAction) -> CliResult {
    let (config, mut app) = open_app()?;

    match action {
        InsightAction::Show { json } => {
            let insight = &app.state().ai_insight;
            if json {
                print_json(insight)?;
            } else if insight.text.is_empty() {
                println!("No insight yet.");
            } else {
                println!("{}", insight.text);
            }
        }
        InsightAction::Refresh { json } => {
            if !app.user().plan.is_paid() {
                return Err(ValidationError::ProFeature("Insights").into());
            }
            let policy = app.insight_policy();
            if !policy.is_due(app.state()) {
                let remaining = policy
                    .threshold()
                    .saturating_sub(app.state().give_ins_since_last_insight);
                println!("Next insight after {remaining} more slip-up(s).");
                return Ok(());
            }
            let companion = companion(&config)?;
            let reply = runtime()?.block_on(app.refresh_insight(&companion, now_ms()));
            match reply {
                Some(reply) if json => print_json(&reply)?,
                Some(reply) => println!("{}", reply.text),
                None => println!("An insight request is already running."),
            }
        }
    }
    Ok(())
}
