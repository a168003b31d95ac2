use crate::dates::Day;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Completion ledger: day-key to completion flag. A `false` entry means the
/// same as a missing one.
pub type Completions = BTreeMap<NaiveDate, bool>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub completions: Completions,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hhmm")]
    pub time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<BTreeSet<Day>>,
}

impl Habit {
    pub fn is_completed_on(&self, day: NaiveDate) -> bool {
        is_completed(&self.completions, day)
    }
}

pub fn is_completed(completions: &Completions, day: NaiveDate) -> bool {
    completions.get(&day).copied().unwrap_or(false)
}

/// Optional fields supplied when a habit is created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitSettings {
    pub time: Option<NaiveTime>,
    pub days: BTreeSet<Day>,
}

/// Full replacement of the editable fields of a habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitUpdate {
    pub name: String,
    pub time: Option<NaiveTime>,
    pub days: BTreeSet<Day>,
}

/// `HH:MM` text form of an optional local time.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn parse(value: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(value.trim(), FORMAT).ok()
    }

    pub fn format(time: NaiveTime) -> String {
        time.format(FORMAT).to_string()
    }

    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.serialize_str(&format(*time)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse(text)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid time of day: {text}"))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HabitRequest {
    pub name: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub days: Vec<Day>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub names: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ToggleRequest {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    pub interests: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HabitView {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub time: Option<String>,
    pub days: Vec<Day>,
    pub completed_today: bool,
    pub due_today: bool,
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HabitListResponse {
    pub loaded: bool,
    pub today: NaiveDate,
    pub habits: Vec<HabitView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodayResponse {
    pub date: NaiveDate,
    pub completed: u32,
    pub total: u32,
    pub percentage: u32,
    pub all_done: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub label: String,
    pub completed: u32,
    pub total: u32,
    pub percentage: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StreakEntry {
    pub id: String,
    pub name: String,
    pub streak: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub weekly: Vec<DailyPoint>,
    pub top_streaks: Vec<StreakEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub habits: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CoachResponse {
    pub message: String,
    pub fallback: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub reminders_enabled: bool,
    pub assistant_configured: bool,
}
