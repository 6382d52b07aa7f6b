//! Urge timing analysis.
//!
//! Buckets slip timestamps by local hour and decides whether one part of
//! the day clearly dominates, the slips are spread across the whole day,
//! or there is no usable pattern yet.

use chrono::{Local, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fewer samples than this never yield a pattern.
pub const MIN_SAMPLES: usize = 5;
/// The top bucket must exceed the runner-up by this factor.
pub const DOMINANCE_RATIO: f64 = 1.5;
/// The top bucket must hold at least this share of all samples.
pub const MINIMUM_SHARE: f64 = 0.4;

/// Coarse part of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    /// 05:00-11:59
    Morning,
    /// 12:00-16:59
    Afternoon,
    /// 17:00-04:59
    EveningNight,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 3] = [
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::EveningNight,
    ];

    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            _ => TimeOfDay::EveningNight,
        }
    }

    fn index(self) -> usize {
        match self {
            TimeOfDay::Morning => 0,
            TimeOfDay::Afternoon => 1,
            TimeOfDay::EveningNight => 2,
        }
    }
}

/// Detected high-risk period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UrgeTiming {
    #[serde(rename = "Morning")]
    Morning,
    #[serde(rename = "Afternoon")]
    Afternoon,
    #[serde(rename = "Evening / Night")]
    EveningNight,
    #[serde(rename = "All Day")]
    AllDay,
}

impl UrgeTiming {
    pub fn label(&self) -> &'static str {
        match self {
            UrgeTiming::Morning => "Morning",
            UrgeTiming::Afternoon => "Afternoon",
            UrgeTiming::EveningNight => "Evening / Night",
            UrgeTiming::AllDay => "All Day",
        }
    }
}

impl From<TimeOfDay> for UrgeTiming {
    fn from(bucket: TimeOfDay) -> Self {
        match bucket {
            TimeOfDay::Morning => UrgeTiming::Morning,
            TimeOfDay::Afternoon => UrgeTiming::Afternoon,
            TimeOfDay::EveningNight => UrgeTiming::EveningNight,
        }
    }
}

impl fmt::Display for UrgeTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify slip timestamps (epoch ms) using the local time zone.
pub fn analyze_urge_timings(timestamps: &[i64]) -> Option<UrgeTiming> {
    analyze_urge_timings_in(timestamps, &Local)
}

/// Classify slip timestamps (epoch ms) with hours taken in `tz`.
///
/// Only the multiset of hours matters; input order is irrelevant.
pub fn analyze_urge_timings_in<Tz: TimeZone>(timestamps: &[i64], tz: &Tz) -> Option<UrgeTiming> {
    let hours: Vec<u32> = timestamps
        .iter()
        .filter_map(|&ms| tz.timestamp_millis_opt(ms).single())
        .map(|dt| dt.hour())
        .collect();
    classify_hours(&hours)
}

/// Classification over already-extracted local hours (0-23).
pub fn classify_hours(hours: &[u32]) -> Option<UrgeTiming> {
    if hours.len() < MIN_SAMPLES {
        return None;
    }

    let mut counts = [0usize; 3];
    for &hour in hours {
        counts[TimeOfDay::from_hour(hour).index()] += 1;
    }
    let total = hours.len() as f64;

    // Stable sort keeps Morning, Afternoon, Evening order among ties.
    let mut ranked: Vec<(TimeOfDay, usize)> = TimeOfDay::ALL
        .iter()
        .map(|&bucket| (bucket, counts[bucket.index()]))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let (dominant, dominant_count) = ranked[0];
    let second_count = ranked[1].1;
    let dominant_count = dominant_count as f64;

    if dominant_count > second_count as f64 * DOMINANCE_RATIO
        && dominant_count / total >= MINIMUM_SHARE
    {
        return Some(dominant.into());
    }

    let average = total / 3.0;
    if counts.iter().all(|&c| c > 0 && c as f64 > average * 0.5) {
        return Some(UrgeTiming::AllDay);
    }

    None
}
