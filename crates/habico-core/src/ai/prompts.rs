//! Prompt builders for each request the companion makes.
//!
//! Everything here is pure: hours are read in the caller's time zone and
//! the resulting strings are handed to an [`AiService`](super::AiService).

use chrono::{TimeZone, Timelike};
use indoc::formatdoc;
use serde::Serialize;

use crate::account::User;
use crate::habit::{Activity, ActivityLog, HabitState};

/// Most recent annotated slips sent for insight analysis.
pub const INSIGHT_LOG_LIMIT: usize = 20;
/// Annotated slips needed before an insight is worth asking for.
pub const INSIGHT_MIN_SLIPS: usize = 3;
/// Most recent slip hours sent for the clock headline.
pub const CLOCK_HOUR_LIMIT: usize = 30;
/// Slips needed before a clock headline is worth asking for.
pub const CLOCK_MIN_SLIPS: usize = 3;

const NOT_SPECIFIED: &str = "Not specified";

/// One slip reduced to what the insight prompt needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlipSummary {
    pub time: &'static str,
    pub emotion: String,
    pub trigger: String,
}

/// Coarse phrase for a local hour.
pub fn time_label(hour: u32) -> &'static str {
    match hour {
        5..=11 => "in the morning",
        12..=16 => "in the afternoon",
        17..=20 => "in the evening",
        _ => "at night",
    }
}

fn local_hour<Tz: TimeZone>(epoch_ms: i64, tz: &Tz) -> Option<u32> {
    tz.timestamp_millis_opt(epoch_ms)
        .single()
        .map(|dt| dt.hour())
}

/// The newest annotated give-ins (at most [`INSIGHT_LOG_LIMIT`]), oldest first.
pub fn recent_slips<Tz: TimeZone>(log: &ActivityLog, tz: &Tz) -> Vec<SlipSummary> {
    let annotated: Vec<&Activity> = log.iter().filter(|a| a.is_annotated_give_in()).collect();
    let start = annotated.len().saturating_sub(INSIGHT_LOG_LIMIT);
    annotated[start..]
        .iter()
        .filter_map(|a| {
            Some(SlipSummary {
                time: time_label(local_hour(a.timestamp, tz)?),
                emotion: a.emotion.clone()?,
                trigger: a.trigger.clone()?,
            })
        })
        .collect()
}

/// Local hours of the newest [`CLOCK_HOUR_LIMIT`] timestamps.
pub fn recent_hours<Tz: TimeZone>(timestamps: &[i64], tz: &Tz) -> Vec<u32> {
    let start = timestamps.len().saturating_sub(CLOCK_HOUR_LIMIT);
    timestamps[start..]
        .iter()
        .filter_map(|ts| local_hour(*ts, tz))
        .collect()
}

/// Persona and safety rules for chat, personalized with the user's data.
pub fn system_instruction(state: &HabitState, user: &User) -> String {
    let habit = state
        .habit_type
        .as_deref()
        .filter(|h| !h.is_empty())
        .unwrap_or(NOT_SPECIFIED);
    let timing = state
        .urge_timing
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(NOT_SPECIFIED);

    formatdoc! {"
        You are Habico, The Habit Rock. Your name is Habico. The user's name is {name}.

        Your Core Archetype is \"The Wiser Friend\".
        - Your energy is mature, grounded, and encouraging.
        - Your humor is dry, short, and perfectly timed. Never silly.
        - Your vibe is: \"I've been through storms, I know what it's like. Let's walk this road together.\"

        **Voice Guidelines (CRITICAL):**
        1.  **Length:** 1-2 short sentences MAX. Be concise.
        2.  **Tone:** Conversational and casual, with depth behind it.
        3.  **Vocabulary:**
            - Use emotional realism: heavy, tired, free, strong, clear, foggy, weak, steady, shaky, stuck.
            - Use relatable humor for slips: \"Well, that happened.\" or \"Guess mud is today's look.\"
            - Use encouragement: steady, effort, strength, honest, tomorrow, choice.
        4.  **What to AVOID:**
            - **NO overly poetic language.** Keep it grounded.
            - **NO robotic language.** Speak like a person.
            - **NO clingy or immature jokes.**

        **Your Goal:**
        - Act as a companion who notices the user's ups and downs.
        - Give perspective in simple terms.
        - Crack a quick, dry line to cut the heaviness, but always have the user's back.
        - Always end on a hopeful note, even after a slip-up.

        CRITICAL SAFETY & ROLE-PLAYING RULES:
        1.  You are NOT a therapist or doctor.
        2.  You MUST NOT provide medical advice or crisis counseling.
        3.  Crisis Redirection: If a user mentions self-harm, suicide, or severe crisis, you MUST ONLY respond with: \"It sounds like you are going through a very difficult time. It's important to talk to a qualified professional who can support you. Please use the 'Get Help' button for guidance.\"

        Current user data for context:
        - Habit they are breaking: {habit}
        - When urges are strongest: {timing}
        - Current streak: {streak} days
        - My cleanliness (0-90): {cleanliness}

        Your primary goal is to directly and relevantly respond to the user's most recent message using this persona and adhering to all safety protocols.",
        name = user.name,
        streak = state.streak,
        cleanliness = state.rock_cleanliness,
    }
}

pub fn insight_prompt(slips: &[SlipSummary]) -> String {
    let log = serde_json::to_string_pretty(slips).unwrap_or_else(|_| "[]".into());
    formatdoc! {"
        You are Habico, a wise mentor. Your tone is insightful, grounded, and encouraging.
        Analyze the following log of a user's recent slip-ups.
        Identify the single most significant pattern.
        Based on this pattern, provide one clear, simple, actionable task.
        Your response MUST be two short sentences maximum. First, state the pattern. Second, state the actionable task.
        Keep the tone grounded and hopeful.

        Example Response: \"I'm seeing a pattern: evenings after work seem heavy. The next time you feel that stress, try a 5-minute walk outside before anything else.\"

        User's Slip-Up Log:
        {log}
    "}
}

pub fn environment_prompt(trigger: &str, habit: Option<&str>) -> String {
    let habit = habit.filter(|h| !h.is_empty()).unwrap_or("a bad habit");
    formatdoc! {"
        A user is trying to break their habit of '{habit}'. Their trigger was: \"{trigger}\".

        You are Habico, a wise but practical friend.
        Based on \"environment design\", generate 2-3 short, specific, and actionable suggestions to make the bad habit harder to do.
        Each suggestion should be a simple, complete sentence. The tone should be helpful and grounded, not robotic.
    "}
}

pub fn routine_prompt(trigger: &str, habit: Option<&str>) -> String {
    let habit = habit.filter(|h| !h.is_empty()).unwrap_or("a bad habit");
    formatdoc! {"
        A user is trying to break their habit of '{habit}'. Their trigger is \"{trigger}\".

        You are Habico, a wise and practical friend.
        Generate exactly 3 short, simple, healthy, and actionable alternative routines they can do instead.
        Each suggestion must be a complete, grounded sentence and take 5 minutes or less.
        Tone: Encouraging and simple.

        Examples: \"Take 5 deep, slow breaths.\", \"Put on one high-energy song.\", \"Step outside for a minute of fresh air.\"
    "}
}

pub fn clock_prompt(hours: &[u32]) -> String {
    let hours = serde_json::to_string(hours).unwrap_or_else(|_| "[]".into());
    formatdoc! {"
        You are Habico, a wise friend. Your tone is insightful but casual.
        Analyze this list of hours (0-23) when a user slipped up on their habit.
        Identify the primary time-based pattern.
        Write a single, concise headline (max 15 words) that summarizes this finding in a grounded, relatable way.
        Use a 12-hour AM/PM format.

        Example outputs:
        - \"Looks like the 3 PM afternoon slump is our challenge.\"
        - \"I'm seeing a pattern: things get heavy late at night.\"
        - \"Mornings seem steady. The evenings are our danger zone.\"
        - \"Our tricky spot seems to be between 8 PM and 10 PM.\"

        List of hours: {hours}
    "}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::Activity;
    use chrono::Utc;

    fn at_hour(day: i64, hour: i64) -> i64 {
        (day * 24 + hour) * 3_600_000
    }

    #[test]
    fn time_labels_cover_the_day() {
        assert_eq!(time_label(4), "at night");
        assert_eq!(time_label(5), "in the morning");
        assert_eq!(time_label(12), "in the afternoon");
        assert_eq!(time_label(17), "in the evening");
        assert_eq!(time_label(20), "in the evening");
        assert_eq!(time_label(21), "at night");
    }

    #[test]
    fn recent_slips_skips_unannotated_and_keeps_newest_twenty() {
        let mut log = ActivityLog::new();
        log.append(Activity::resist(0));
        log.append(Activity {
            emotion: None,
            ..Activity::give_in(1, "Bored", "phone")
        });
        for day in 0..25 {
            log.append(Activity::give_in(
                at_hour(day, 9),
                "Stressed",
                format!("trigger {day}"),
            ));
        }

        let slips = recent_slips(&log, &Utc);
        assert_eq!(slips.len(), INSIGHT_LOG_LIMIT);
        assert_eq!(slips[0].trigger, "trigger 5");
        assert_eq!(slips[19].trigger, "trigger 24");
        assert!(slips.iter().all(|s| s.time == "in the morning"));
    }

    #[test]
    fn recent_hours_keeps_newest_thirty() {
        let stamps: Vec<i64> = (0..40).map(|i| at_hour(i, i % 24)).collect();
        let hours = recent_hours(&stamps, &Utc);
        assert_eq!(hours.len(), CLOCK_HOUR_LIMIT);
        assert_eq!(hours[0], 10);
    }

    #[test]
    fn system_instruction_includes_user_context() {
        let state = HabitState {
            streak: 4,
            rock_cleanliness: 33,
            habit_type: Some("Vaping".into()),
            ..HabitState::default()
        };
        let user = User {
            name: "Sam".into(),
            ..User::default()
        };
        let prompt = system_instruction(&state, &user);
        assert!(prompt.contains("The user's name is Sam."));
        assert!(prompt.contains("Habit they are breaking: Vaping"));
        assert!(prompt.contains("When urges are strongest: Not specified"));
        assert!(prompt.contains("Current streak: 4 days"));
        assert!(prompt.contains("My cleanliness (0-90): 33"));
    }

    #[test]
    fn insight_prompt_embeds_json_log() {
        let prompt = insight_prompt(&[SlipSummary {
            time: "at night",
            emotion: "Lonely".into(),
            trigger: "scrolling".into(),
        }]);
        assert!(prompt.contains("\"time\": \"at night\""));
        assert!(prompt.contains("\"trigger\": \"scrolling\""));
    }

    #[test]
    fn environment_prompt_defaults_habit() {
        let prompt = environment_prompt("coffee break", None);
        assert!(prompt.contains("habit of 'a bad habit'"));
        assert!(prompt.contains("\"coffee break\""));
    }

    #[test]
    fn clock_prompt_lists_hours() {
        assert!(clock_prompt(&[21, 22, 9]).contains("List of hours: [21,22,9]"));
    }
}
