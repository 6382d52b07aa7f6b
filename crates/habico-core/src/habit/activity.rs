//! Logged user actions and the append-only log that holds them.

use serde::{Deserialize, Serialize};

/// What the user did at a moment of urge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    /// Avoided the habit.
    Resist,
    /// Performed the habit despite the urge.
    GiveIn,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Resist => "resist",
            ActivityAction::GiveIn => "give_in",
        }
    }
}

/// One logged event. Immutable once appended to an [`ActivityLog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub action: ActivityAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
}

impl Activity {
    pub fn resist(timestamp: i64) -> Self {
        Self {
            timestamp,
            action: ActivityAction::Resist,
            emotion: None,
            trigger: None,
        }
    }

    pub fn give_in(timestamp: i64, emotion: impl Into<String>, trigger: impl Into<String>) -> Self {
        Self {
            timestamp,
            action: ActivityAction::GiveIn,
            emotion: Some(emotion.into()),
            trigger: Some(trigger.into()),
        }
    }

    pub fn is_give_in(&self) -> bool {
        self.action == ActivityAction::GiveIn
    }

    /// A give-in carrying both a non-empty emotion and trigger.
    pub fn is_annotated_give_in(&self) -> bool {
        self.is_give_in()
            && self.emotion.as_deref().is_some_and(|e| !e.is_empty())
            && self.trigger.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Ordered sequence of activities; insertion order is chronological order.
///
/// The log only exposes appends and read access, so no entry can be
/// mutated or removed once recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLog(Vec<Activity>);

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, activity: Activity) {
        self.0.push(activity);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Activity> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Activity] {
        &self.0
    }

    pub fn last(&self) -> Option<&Activity> {
        self.0.last()
    }

    pub fn give_ins(&self) -> impl Iterator<Item = &Activity> {
        self.0.iter().filter(|a| a.is_give_in())
    }

    /// Timestamps of every give-in, in log order.
    pub fn give_in_timestamps(&self) -> Vec<i64> {
        self.give_ins().map(|a| a.timestamp).collect()
    }

    pub fn count(&self, action: ActivityAction) -> usize {
        self.0.iter().filter(|a| a.action == action).count()
    }
}

impl From<Vec<Activity>> for ActivityLog {
    fn from(entries: Vec<Activity>) -> Self {
        Self(entries)
    }
}

impl<'a> IntoIterator for &'a ActivityLog {
    type Item = &'a Activity;
    type IntoIter = std::slice::Iter<'a, Activity>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
