use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "habico-cli", version, about = "Habico CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log actions and view progress
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Slip statistics and patterns
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// AI insights from your slip-ups
    Insight {
        #[command(subcommand)]
        action: commands::insight::InsightAction,
    },
    /// Chat with Habico
    Chat {
        #[command(subcommand)]
        action: commands::chat::ChatAction,
    },
    /// Rewire suggestions for a trigger
    Suggest {
        #[command(subcommand)]
        action: commands::suggest::SuggestAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Profile and plan
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// API key management
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Deal the wisdom cards in random order
    Wisdom(commands::wisdom::WisdomArgs),
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("HABICO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Habit { action } => commands::habit::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Insight { action } => commands::insight::run(action),
        Commands::Chat { action } => commands::chat::run(action),
        Commands::Suggest { action } => commands::suggest::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::User { action } => commands::user::run(action),
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Wisdom(args) => commands::wisdom::run(args),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "habico-cli", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
