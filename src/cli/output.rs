use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::habit::{Habit, Rating};
use crate::model::language::Language;
use crate::model::theme::Theme;
use crate::util::unicode::{display_width, pad_to_width, truncate_to_width};

/// Titles longer than this are cut in list output
const MAX_TITLE_CELLS: usize = 60;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitJson {
    pub id: String,
    pub title: String,
    pub rating: Rating,
    /// 1-based, as shown in list output
    pub position: usize,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct ThemeJson {
    pub theme: Theme,
    /// True when nothing is stored and the configured default applies
    pub default: bool,
}

#[derive(Serialize)]
pub struct LangJson {
    pub language: Language,
    pub template: &'static str,
}

#[derive(Serialize)]
pub struct NameJson {
    pub title: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn habit_to_json(habit: &Habit) -> HabitJson {
    HabitJson {
        id: habit.id.to_string(),
        title: habit.title.clone(),
        rating: habit.rating,
        position: habit.order + 1,
        created_at: habit.created_at,
        updated_at: habit.updated_at,
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// One list row: `  2. [+] Title                     1a2b3c4d`
pub fn format_habit_line(habit: &Habit, title_cells: usize) -> String {
    let title = truncate_to_width(&habit.title, MAX_TITLE_CELLS);
    format!(
        "{:>3}. [{}] {}  {}",
        habit.order + 1,
        habit.rating.glyph(),
        pad_to_width(&title, title_cells),
        habit.short_id()
    )
}

/// Full list in `order`. Expects `habits` already sorted.
pub fn format_habit_list(habits: &[Habit]) -> String {
    if habits.is_empty() {
        return "No habits yet. Add your first one with `hb add`.\n".to_string();
    }
    let title_cells = habits
        .iter()
        .map(|h| display_width(&truncate_to_width(&h.title, MAX_TITLE_CELLS)))
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for habit in habits {
        out.push_str(&format_habit_line(habit, title_cells));
        out.push('\n');
    }
    out
}
