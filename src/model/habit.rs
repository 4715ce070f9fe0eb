use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable habit identifier, assigned once at creation.
///
/// Always a UUID. A stored record whose `id` is not a UUID makes the whole
/// `habits.json` unreadable; its contents then go to the recovery log.
pub type HabitId = Uuid;

/// Qualitative marker on a habit.
///
/// Stored as `plus` / `neutral` / `minus`, the format older data files use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    #[serde(rename = "plus", alias = "positive")]
    Positive,
    #[default]
    #[serde(rename = "neutral")]
    Neutral,
    #[serde(rename = "minus", alias = "negative")]
    Negative,
}

impl Rating {
    /// Single-character marker used in list output
    pub fn glyph(self) -> char {
        match self {
            Rating::Positive => '+',
            Rating::Neutral => '·',
            Rating::Negative => '-',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rating::Positive => "plus",
            Rating::Neutral => "neutral",
            Rating::Negative => "minus",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when rating text is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rating '{0}' (expected plus, neutral or minus)")]
pub struct ParseRatingError(pub String);

impl FromStr for Rating {
    type Err = ParseRatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plus" | "positive" | "+" => Ok(Rating::Positive),
            "neutral" | "0" | "=" => Ok(Rating::Neutral),
            "minus" | "negative" | "-" => Ok(Rating::Negative),
            _ => Err(ParseRatingError(s.to_string())),
        }
    }
}

/// A single tracked habit.
///
/// Field names and timestamp encoding (epoch milliseconds) match the JSON
/// layout of `habits.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub title: String,
    #[serde(default)]
    pub rating: Rating,
    /// Zero-based position; rewritten by `ops::order` on every structural change
    #[serde(default)]
    pub order: usize,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Habit {
    /// Create a fresh habit with a generated id. `order` is provisional
    /// until the habit is placed into a collection.
    pub fn new(title: impl Into<String>, rating: Rating, now: DateTime<Utc>) -> Self {
        Habit {
            id: Uuid::new_v4(),
            title: title.into(),
            rating,
            order: 0,
            created_at: now,
            updated_at: Some(now),
        }
    }

    /// Record a mutation
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }

    /// First 8 hex digits of the id, used in list output
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }
}
