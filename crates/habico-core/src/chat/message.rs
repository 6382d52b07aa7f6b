use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

/// A web page the model grounded its reply on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    /// Epoch ms.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<GroundingSource>>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            timestamp,
            sources: None,
        }
    }

    pub fn model(text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
            timestamp,
            sources: None,
        }
    }
}

/// One increment of a streamed reply.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatUpdate {
    pub text_chunk: Option<String>,
    pub sources: Option<Vec<GroundingSource>>,
}

impl ChatUpdate {
    pub fn text(chunk: impl Into<String>) -> Self {
        Self {
            text_chunk: Some(chunk.into()),
            sources: None,
        }
    }

    pub fn sources(sources: Vec<GroundingSource>) -> Self {
        Self {
            text_chunk: None,
            sources: Some(sources),
        }
    }
}

/// User-message counters for the free-plan quota.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatCount {
    pub daily: u32,
    pub monthly: u32,
    /// `YYYY-MM-DD` (UTC) of the last counted message.
    pub last_chat_date: String,
}

impl ChatCount {
    pub fn starting(now_ms: i64) -> Self {
        Self {
            daily: 0,
            monthly: 0,
            last_chat_date: utc_date_string(now_ms),
        }
    }

    /// Reset counters that belong to an earlier day or month.
    pub fn roll_over(&mut self, now_ms: i64) {
        let today = utc_date_string(now_ms);
        if self.last_chat_date == today {
            return;
        }
        self.daily = 0;
        if self.last_chat_date.get(..7) != today.get(..7) {
            self.monthly = 0;
        }
        self.last_chat_date = today;
    }
}

pub(crate) fn utc_date_string(epoch_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .unwrap_or_default()
        .format("%Y-%m-%d")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ms(y: i32, m: u32, d: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn roll_over_resets_daily_on_new_day() {
        let mut count = ChatCount {
            daily: 3,
            monthly: 10,
            last_chat_date: "2025-05-01".into(),
        };
        count.roll_over(ms(2025, 5, 2));
        assert_eq!(count.daily, 0);
        assert_eq!(count.monthly, 10);
        assert_eq!(count.last_chat_date, "2025-05-02");
    }

    #[test]
    fn roll_over_resets_monthly_on_new_month() {
        let mut count = ChatCount {
            daily: 1,
            monthly: 29,
            last_chat_date: "2025-05-31".into(),
        };
        count.roll_over(ms(2025, 6, 1));
        assert_eq!((count.daily, count.monthly), (0, 0));
    }

    #[test]
    fn roll_over_same_day_keeps_counts() {
        let mut count = ChatCount {
            daily: 2,
            monthly: 2,
            last_chat_date: "2025-05-01".into(),
        };
        count.roll_over(ms(2025, 5, 1));
        assert_eq!((count.daily, count.monthly), (2, 2));
    }

    #[test]
    fn message_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::user("hi", 1)).unwrap();
        assert_eq!(json, r#"{"role":"user","text":"hi","timestamp":1}"#);
    }
}
