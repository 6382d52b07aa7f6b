use std::io::Write;

use clap::Subcommand;
use habico_core::{ChatRole, ChatUpdate};

use super::{companion, now_ms, open_app, print_json, runtime, CliResult};

const DISCLAIMER: &str = "\
Important notice

The Habit Rock is an AI data analyst designed for motivation and habit-tracking. \
It is not a therapist, doctor, or a substitute for professional medical or mental health advice.

It cannot diagnose conditions or provide crisis support. Your conversations are analyzed \
to improve the service and are not private in the way a conversation with a doctor would be.

If you are in crisis or feeling overwhelmed, please contact a qualified professional \
or a crisis support service in your area immediately.";

#[derive(Subcommand)]
pub enum ChatAction {
    /// Send a message to Habico
    Send {
        /// Message text
        message: String,
    },
    /// Show the conversation
    History {
        /// Only the most recent N messages
        #[arg(long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the chat notice
    Disclaimer,
}

pub fn run(action: ChatAction) -> CliResult {
    let (config, mut app) = open_app()?;

    match action {
        ChatAction::Send { message } => {
            if !app.disclaimer_seen() {
                eprintln!("{DISCLAIMER}\n");
                app.mark_disclaimer_seen();
            }
            if let Some(limit) = app.chat_limit_message() {
                return Err(limit.into());
            }

            let companion = companion(&config)?;
            let rt = runtime()?;
            let mut stdout = std::io::stdout();
            print!("Habico: ");
            let answered = rt.block_on(app.send_chat(
                &companion,
                &message,
                now_ms(),
                &mut |update: &ChatUpdate| {
                    if let Some(chunk) = &update.text_chunk {
                        print!("{chunk}");
                        let _ = stdout.flush();
                    }
                },
            ))?;
            println!();

            if let Some(sources) = app
                .state()
                .chat_history
                .last()
                .and_then(|m| m.sources.as_ref())
                .filter(|s| !s.is_empty())
            {
                println!();
                for source in sources {
                    println!("  [{}] {}", source.title, source.uri);
                }
            }
            if !answered {
                tracing::debug!("chat reply used the fallback line");
            }
        }
        ChatAction::History { limit, json } => {
            let history = &app.state().chat_history;
            let start = limit.map_or(0, |n| history.len().saturating_sub(n));
            let history = &history[start..];
            if json {
                print_json(&history)?;
            } else {
                for message in history {
                    let who = match message.role {
                        ChatRole::User => app.user().name.as_str(),
                        ChatRole::Model => "Habico",
                    };
                    println!("{who}: {}", message.text);
                }
            }
        }
        ChatAction::Disclaimer => {
            println!("{DISCLAIMER}");
            app.mark_disclaimer_seen();
        }
    }
    Ok(())
}
