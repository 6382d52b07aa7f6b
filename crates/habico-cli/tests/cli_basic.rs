//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary home
//! directory and checks the output.

use std::path::Path;
use std::process::Command;

/// Run a CLI command with `home` as the home directory.
fn run_cli(home: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_habico-cli"))
        .args(args)
        .env("HOME", home)
        .env_remove("HABICO_ENV")
        .env_remove("GEMINI_API_KEY")
        .env_remove("API_KEY")
        .output()
        .expect("Failed to execute CLI command");

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (code, stdout, stderr)
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("stdout is not JSON")
}

#[test]
fn test_status_on_fresh_install() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["habit", "status", "--json"]);
    assert_eq!(code, 0, "habit status failed");

    let status = json(&stdout);
    assert_eq!(status["day"], 0);
    assert_eq!(status["streak"], 0);
    assert_eq!(status["plan"], "free");
    assert!(home.path().join(".config/habico/habico.db").exists());
}

#[test]
fn test_resist_counts_once_per_day() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["habit", "resist", "--json"]);
    assert_eq!(code, 0, "first resist failed");
    assert_eq!(json(&stdout)["outcome"]["outcome"], "credited");

    let (code, stdout, _) = run_cli(home.path(), &["habit", "resist", "--json"]);
    assert_eq!(code, 0, "second resist failed");
    let second = json(&stdout);
    assert_eq!(second["outcome"]["outcome"], "already_credited_today");
    assert_eq!(second["day"], 1);
}

#[test]
fn test_give_in_is_logged() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(
        home.path(),
        &[
            "habit", "give-in", "--emotion", "Bored", "--trigger", "phone", "--json",
        ],
    );
    assert_eq!(code, 0, "give-in failed: {stderr}");

    let (code, stdout, _) = run_cli(home.path(), &["habit", "log", "--json"]);
    assert_eq!(code, 0);
    let log = json(&stdout);
    assert_eq!(log[0]["action"], "give_in");
    assert_eq!(log[0]["trigger"], "phone");
}

#[test]
fn test_give_in_requires_trigger_text() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(
        home.path(),
        &["habit", "give-in", "--emotion", "Sad", "--trigger", "   "],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("'trigger' must not be empty"));
}

#[test]
fn test_give_in_rejects_unknown_emotion() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(
        home.path(),
        &["habit", "give-in", "--emotion", "Furious", "--trigger", "x"],
    );
    assert_ne!(code, 0);
}

#[test]
fn test_config_get_and_set() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["config", "get", "ai.model"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "gemini-2.5-flash");

    let (code, _, _) = run_cli(home.path(), &["config", "set", "chat.free_daily_limit", "5"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "chat.free_daily_limit"]);
    assert_eq!(stdout.trim(), "5");

    let (code, _, stderr) = run_cli(home.path(), &["config", "get", "nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_free_plan_cannot_refresh_insights() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["insight", "refresh"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Monthly and Lifetime"));
}

#[test]
fn test_free_plan_cannot_apply_timing_or_clock_headline() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["stats", "pattern", "--apply"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Timing suggestions"));

    let (code, _, stderr) = run_cli(home.path(), &["stats", "clock", "--headline"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Habit clock headlines"));
}

#[test]
fn test_paid_plan_with_no_pattern_has_nothing_to_apply() {
    let home = tempfile::tempdir().unwrap();
    run_cli(home.path(), &["user", "set", "--plan", "monthly"]);
    let (code, stdout, _) = run_cli(home.path(), &["stats", "pattern", "--apply"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Not enough data yet."));
    assert!(stdout.contains("Nothing new to save."));
}

#[test]
fn test_wisdom_deals_every_card() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["wisdom", "--json"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout).as_array().unwrap().len(), 10);

    let (_, stdout, _) = run_cli(home.path(), &["wisdom", "--count", "3"]);
    assert_eq!(stdout.lines().count(), 3);
}

#[test]
fn test_user_plan_update_and_logout() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(
        home.path(),
        &["user", "set", "--name", "Sam", "--plan", "lifetime"],
    );
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(home.path(), &["user", "show", "--json"]);
    let user = json(&stdout);
    assert_eq!(user["name"], "Sam");
    assert_eq!(user["plan"], "lifetime");

    let (code, _, _) = run_cli(home.path(), &["user", "logout"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(home.path(), &["user", "show", "--json"]);
    assert_eq!(json(&stdout)["plan"], "free");
}

#[test]
fn test_pattern_needs_data() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["stats", "pattern"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Not enough data"));
}

#[test]
fn test_completions() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("habico-cli"));
}
