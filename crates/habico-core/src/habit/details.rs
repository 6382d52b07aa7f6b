//! Building the details of a slip from what the user picked.

use chrono::{DateTime, Days, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Emotions offered when logging a slip.
pub const EMOTIONS: [&str; 6] = ["Stressed", "Bored", "Tired", "Sad", "Anxious", "Happy"];

/// Which day a slip happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlipDay {
    #[default]
    Today,
    Yesterday,
}

/// User-supplied details of a slip.
///
/// `timestamp` may be back-dated; it is what the activity log records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiveInDetails {
    pub emotion: String,
    pub trigger: String,
    pub timestamp: i64,
}

impl GiveInDetails {
    pub fn new(emotion: impl Into<String>, trigger: &str, timestamp: i64) -> Self {
        Self {
            emotion: emotion.into(),
            trigger: trigger.trim().to_string(),
            timestamp,
        }
    }

    /// Details for a slip on `day` at local clock `time` (keeps the current
    /// clock time when `time` is `None`).
    ///
    /// Returns `None` only when the requested wall-clock time does not exist
    /// in `now`'s zone (a DST gap).
    pub fn at_local<Tz: TimeZone>(
        emotion: impl Into<String>,
        trigger: &str,
        day: SlipDay,
        time: Option<NaiveTime>,
        now: &DateTime<Tz>,
    ) -> Option<Self> {
        let local = now.naive_local();
        let date = match day {
            SlipDay::Today => local.date(),
            SlipDay::Yesterday => local.date().checked_sub_days(Days::new(1))?,
        };
        let when = date.and_time(time.unwrap_or_else(|| local.time()));
        let stamp = now.timezone().from_local_datetime(&when).earliest()?;
        Some(Self::new(emotion, trigger, stamp.timestamp_millis()))
    }

    /// Shell-side check: a slip needs a trigger description.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.trigger.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "trigger".into(),
            });
        }
        if self.emotion.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "emotion".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn yesterday_at_clock_time() {
        let now = Utc.with_ymd_and_hms(2025, 4, 10, 15, 30, 0).unwrap();
        let time = NaiveTime::from_hms_opt(21, 0, 0);
        let details =
            GiveInDetails::at_local("Tired", "  late show  ", SlipDay::Yesterday, time, &now)
                .unwrap();

        let expected = Utc.with_ymd_and_hms(2025, 4, 9, 21, 0, 0).unwrap();
        assert_eq!(details.timestamp, expected.timestamp_millis());
        assert_eq!(details.trigger, "late show");
    }

    #[test]
    fn today_without_time_keeps_now() {
        let now = Utc.with_ymd_and_hms(2025, 4, 10, 8, 5, 0).unwrap();
        let details = GiveInDetails::at_local("Bored", "tv", SlipDay::Today, None, &now).unwrap();
        assert_eq!(details.timestamp, now.timestamp_millis());
    }

    #[test]
    fn blank_trigger_is_rejected() {
        let details = GiveInDetails::new("Sad", "   ", 0);
        assert!(matches!(
            details.validate(),
            Err(ValidationError::EmptyField { field }) if field == "trigger"
        ));
        assert!(GiveInDetails::new("Sad", "rain", 0).validate().is_ok());
    }
}
