//! Canned replies used when the AI service is skipped or fails.

pub const INSIGHT_NOT_ENOUGH_DATA: &str = "Log a few more slip-ups with your emotion and trigger, and I'll be able to find a pattern for you.";

pub const INSIGHT_UNAVAILABLE: &str =
    "I'm having a little trouble thinking right now. Let's check back in later.";

pub const CHAT_UNAVAILABLE: &str =
    "\n\nMy circuits are a bit scrambled right now. Try again in a moment.";

pub const CLOCK_NOT_ENOUGH_DATA: &str =
    "Log a few more slip-ups to see your time-based patterns here.";

pub const CLOCK_UNAVAILABLE: &str =
    "Your time-based patterns will appear here as you log more data.";

pub const ENVIRONMENT_SUGGESTIONS: [&str; 3] = [
    "Make the first step towards your habit harder to do.",
    "Set up a physical barrier between you and the temptation.",
    "Replace the trigger item with a healthier alternative.",
];

pub const ROUTINE_SUGGESTIONS: [&str; 3] = [
    "Take 5 deep breaths, focusing on the exhale.",
    "Drink a full glass of water.",
    "Do a quick 2-minute stretch.",
];

pub(crate) fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|line| (*line).to_string()).collect()
}
