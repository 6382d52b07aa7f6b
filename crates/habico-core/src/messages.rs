//! Canned lines the rock says after an action or while idle.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::habit::ActivityAction;

/// How clean the rock looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RockMood {
    Dirty,
    Cleaning,
    Shiny,
}

impl RockMood {
    pub fn from_cleanliness(cleanliness: u32) -> Self {
        match cleanliness {
            0..=29 => RockMood::Dirty,
            30..=59 => RockMood::Cleaning,
            _ => RockMood::Shiny,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RockMood::Dirty => "dirty",
            RockMood::Cleaning => "cleaning",
            RockMood::Shiny => "shiny",
        }
    }
}

const RESIST_DIRTY: &[&str] = &[
    "Good. That's one honest step.",
    "Effort. That's what I felt just now.",
    "A small choice, a big difference. Keep going.",
    "Nice. You chose strength over the urge.",
];

const RESIST_CLEANING: &[&str] = &[
    "Alright, that feels lighter. We're getting somewhere.",
    "Keep this up. I'm starting to feel steady.",
    "Now we're talking. That felt clear.",
    "You're building something real. I can feel it.",
];

const RESIST_SHINY: &[&str] = &[
    "Look at that. That's the result of honest work.",
    "This is what strength looks like. Well done.",
    "We're making real progress. This feels different.",
    "This feels free. Thank you.",
];

const GIVE_IN_STREAK_BROKEN: &[&str] = &[
    "Well, that happened. The streak is gone, but we're not.",
    "A stumble. It's part of the road. Let's get up.",
    "Not perfect, but not quitting. That's what matters. Tomorrow.",
    "Guess mud is today's look. It's okay, it washes off.",
];

const GIVE_IN_OTHER: &[&str] = &[
    "Okay, a slip. Let's be honest about it and move on.",
    "Another one for the books. What did we learn?",
    "The {timing} got us. Good to know.",
    "No judgment. Just data. Let's use it.",
];

pub const AMBIENT: &[&str] = &[
    "Today might feel heavy. That's okay.",
    "Steady now. Just this moment.",
    "A stumble is not a fall. The path is still here.",
    "Feel that? The quiet effort. It's working.",
    "This is a choice. You're making it right now.",
    "The urge feels big, but it's temporary. You're not.",
    "Clarity comes from small, honest steps.",
    "I'm with you. We can carry this together.",
    "Just breathe. The feeling will pass.",
    "You're stronger than you were yesterday. Feel it.",
];

pub fn ambient_message<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    AMBIENT.choose(rng).copied().unwrap_or(AMBIENT[0])
}

/// Reaction to an action, picked by mood and whether a streak was lost.
pub fn reaction_message<R: Rng + ?Sized>(
    rng: &mut R,
    action: ActivityAction,
    cleanliness: u32,
    streak_broken: bool,
    urge_timing: Option<&str>,
) -> String {
    let pool = match action {
        ActivityAction::Resist => match RockMood::from_cleanliness(cleanliness) {
            RockMood::Dirty => RESIST_DIRTY,
            RockMood::Cleaning => RESIST_CLEANING,
            RockMood::Shiny => RESIST_SHINY,
        },
        ActivityAction::GiveIn if streak_broken => GIVE_IN_STREAK_BROKEN,
        ActivityAction::GiveIn => GIVE_IN_OTHER,
    };
    let line = pool.choose(rng).copied().unwrap_or(pool[0]);
    let timing = urge_timing
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| "usual time".to_string());
    line.replace("{timing}", &timing)
}
