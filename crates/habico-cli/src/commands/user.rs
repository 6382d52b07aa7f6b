use clap::Subcommand;
use habico_core::{Plan, UserUpdate};

use super::{now_ms, open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum UserAction {
    /// Show the profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit the profile
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// free, monthly or lifetime
        #[arg(long)]
        plan: Option<Plan>,
    },
    /// Log out: forget the profile and habit data
    Logout,
    /// Delete the account and all habit data
    Delete {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: UserAction) -> CliResult {
    let (_config, mut app) = open_app()?;

    match action {
        UserAction::Show { json } => {
            let user = app.user();
            if json {
                print_json(user)?;
            } else {
                println!("Name:  {}", user.name);
                println!("Email: {}", user.email);
                println!("Plan:  {}", user.plan);
            }
        }
        UserAction::Set { name, email, plan } => {
            let user = app.update_user(UserUpdate { name, email, plan })?;
            println!("Saved profile for {} ({}).", user.name, user.plan);
        }
        UserAction::Logout => {
            app.clear_account(now_ms());
            println!("Logged out.");
        }
        UserAction::Delete { yes } => {
            if !yes {
                return Err("refusing to delete the account without --yes".into());
            }
            app.clear_account(now_ms());
            println!("Account deleted.");
        }
    }
    Ok(())
}
