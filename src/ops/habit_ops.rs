use chrono::{DateTime, Utc};

use crate::model::habit::{Habit, HabitId, Rating};
use crate::model::language::Language;
use crate::ops::naming::generate_default_name;
use crate::ops::order::{self, OrderError};

/// Input rejected before it reaches the collection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("a habit named '{0}' already exists")]
    DuplicateTitle(String),
    #[error("'{0}' matches more than one habit")]
    Ambiguous(String),
    #[error("invalid position: {0}")]
    InvalidPosition(String),
}

/// Error type for habit operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HabitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("habit not found: {0}")]
    NotFound(String),
}

impl From<OrderError> for HabitError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NotFound(id) => HabitError::NotFound(id.to_string()),
        }
    }
}

/// Caller input for a new habit. A missing title is filled in by the
/// name allocator.
#[derive(Debug, Clone, Default)]
pub struct NewHabit {
    pub title: Option<String>,
    pub rating: Option<Rating>,
}

/// Fields to change on an existing habit
#[derive(Debug, Clone, Default)]
pub struct HabitUpdate {
    pub title: Option<String>,
    pub rating: Option<Rating>,
}

/// Comparison key for titles: trimmed and lowercased
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

fn title_taken<'a>(mut others: impl Iterator<Item = &'a Habit>, key: &str) -> bool {
    others.any(|h| normalize_title(&h.title) == key)
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// Create a habit and place it at `index` (see `order::insert_at` for
/// clamping). Returns the new collection and the new habit's id.
pub fn create_habit(
    habits: Vec<Habit>,
    new: NewHabit,
    index: Option<isize>,
    lang: Language,
    now: DateTime<Utc>,
) -> Result<(Vec<Habit>, HabitId), HabitError> {
    let title = match new.title {
        Some(t) => t,
        None => generate_default_name(&habits, lang),
    };

    let key = normalize_title(&title);
    if key.is_empty() {
        return Err(ValidationError::EmptyTitle.into());
    }
    if title_taken(habits.iter(), &key) {
        return Err(ValidationError::DuplicateTitle(title.trim().to_string()).into());
    }

    let habit = Habit::new(title, new.rating.unwrap_or_default(), now);
    let id = habit.id;
    Ok((order::insert_at(habits, habit, index), id))
}

/// Rename and/or re-rate a habit.
///
/// A title that is blank after trimming is ignored. Nothing is written (and
/// `updated_at` stays put) when the update changes nothing.
pub fn update_habit(
    mut habits: Vec<Habit>,
    id: HabitId,
    update: HabitUpdate,
    now: DateTime<Utc>,
) -> Result<Vec<Habit>, HabitError> {
    let idx = habits
        .iter()
        .position(|h| h.id == id)
        .ok_or_else(|| HabitError::NotFound(id.to_string()))?;

    let new_title = update
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(title) = new_title {
        let key = normalize_title(title);
        if title_taken(habits.iter().filter(|h| h.id != id), &key) {
            return Err(ValidationError::DuplicateTitle(title.to_string()).into());
        }
    }

    let habit = &mut habits[idx];
    let mut changed = false;
    if let Some(title) = new_title
        && habit.title != title
    {
        habit.title = title.to_string();
        changed = true;
    }
    if let Some(rating) = update.rating
        && habit.rating != rating
    {
        habit.rating = rating;
        changed = true;
    }
    if changed {
        habit.touch(now);
    }
    Ok(habits)
}

/// Move a habit so it ends at position `target` (0-based).
pub fn move_habit(
    habits: Vec<Habit>,
    id: HabitId,
    target: isize,
    now: DateTime<Utc>,
) -> Result<Vec<Habit>, HabitError> {
    Ok(order::move_to(habits, id, target, now)?)
}

/// Apply the outcome of dragging `active` and dropping it on `over`.
///
/// The dragged habit takes the position `over` held before the move, so it
/// lands after `over` when moving down and before it when moving up.
pub fn drop_habit_onto(
    habits: Vec<Habit>,
    active: HabitId,
    over: HabitId,
    now: DateTime<Utc>,
) -> Result<Vec<Habit>, HabitError> {
    let mut sorted = habits;
    order::sort_by_order(&mut sorted);
    if !sorted.iter().any(|h| h.id == active) {
        return Err(HabitError::NotFound(active.to_string()));
    }
    let target = sorted
        .iter()
        .position(|h| h.id == over)
        .ok_or_else(|| HabitError::NotFound(over.to_string()))?;
    if active == over {
        return Ok(sorted);
    }
    move_habit(sorted, active, target as isize, now)
}

pub fn delete_habit(habits: Vec<Habit>, id: HabitId) -> Result<Vec<Habit>, HabitError> {
    Ok(order::remove_and_reindex(habits, id)?)
}

/// Remove every habit
pub fn clear_habits() -> Vec<Habit> {
    Vec::new()
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Minimum length of an id prefix accepted by `resolve_habit`
const MIN_ID_PREFIX: usize = 4;

/// Resolve a user-supplied reference to a habit id.
///
/// Tried in turn: 1-based position, full id, unique id prefix, title
/// (case-insensitive, trimmed). A numeric title is only reachable by title
/// when no habit holds that position.
pub fn resolve_habit(habits: &[Habit], query: &str) -> Result<HabitId, HabitError> {
    let q = query.trim();
    if q.is_empty() {
        return Err(HabitError::NotFound(query.to_string()));
    }

    if let Ok(pos) = q.parse::<usize>() {
        if let Some(h) = pos
            .checked_sub(1)
            .and_then(|order| habits.iter().find(|h| h.order == order))
        {
            return Ok(h.id);
        }
    }

    if let Ok(id) = uuid::Uuid::parse_str(q)
        && habits.iter().any(|h| h.id == id)
    {
        return Ok(id);
    }

    let lowered = q.to_ascii_lowercase();
    if lowered.len() >= MIN_ID_PREFIX && lowered.chars().all(|c| c.is_ascii_hexdigit()) {
        let matches: Vec<&Habit> = habits
            .iter()
            .filter(|h| h.id.simple().to_string().starts_with(&lowered))
            .collect();
        match matches.as_slice() {
            [one] => return Ok(one.id),
            [] => {}
            _ => return Err(ValidationError::Ambiguous(q.to_string()).into()),
        }
    }

    let key = normalize_title(q);
    habits
        .iter()
        .find(|h| normalize_title(&h.title) == key)
        .map(|h| h.id)
        .ok_or_else(|| HabitError::NotFound(query.to_string()))
}

/// Parse a 1-based position from the CLI into a 0-based index
pub fn parse_position(s: &str) -> Result<isize, ValidationError> {
    let n: isize = s
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidPosition(s.to_string()))?;
    if n < 1 {
        return Err(ValidationError::InvalidPosition(format!(
            "{} (positions start at 1)",
            s
        )));
    }
    Ok(n - 1)
}
