pub mod auth;
pub mod chat;
pub mod config;
pub mod habit;
pub mod insight;
pub mod stats;
pub mod suggest;
pub mod user;
pub mod wisdom;

use habico_core::storage::Database;
use habico_core::{Companion, Config, GeminiClient, HabicoApp};
use tokio::runtime::Runtime;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Config plus the session loaded from the default database.
pub fn open_app() -> Result<(Config, HabicoApp<Database>), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let app = HabicoApp::load(db, &config, now_ms());
    Ok((config, app))
}

pub fn companion(config: &Config) -> Result<Companion<GeminiClient>, Box<dyn std::error::Error>> {
    let client = GeminiClient::from_config(&config.ai)?;
    Ok(Companion::new(client))
}

pub fn runtime() -> Result<Runtime, std::io::Error> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
