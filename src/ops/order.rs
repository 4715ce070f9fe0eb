//! Position bookkeeping for the habit collection.
//!
//! Every function takes the collection by value and hands back a new one.
//! On return `order` values are exactly `0..n` with no gaps or repeats.

use chrono::{DateTime, Utc};

use crate::model::habit::{Habit, HabitId};

/// Error type for ordering operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("habit not found: {0}")]
    NotFound(HabitId),
}

/// Rewrite every `order` to its index in `habits`.
///
/// The input must already be in the intended sequence; this does not sort.
pub fn reindex(mut habits: Vec<Habit>) -> Vec<Habit> {
    for (i, habit) in habits.iter_mut().enumerate() {
        habit.order = i;
    }
    habits
}

/// Stable ascending sort by `order`. Records sharing an `order` keep their
/// relative input sequence.
pub fn sort_by_order(habits: &mut [Habit]) {
    habits.sort_by_key(|h| h.order);
}

/// True when `order` values are exactly `0..n` in some arrangement
pub fn is_contiguous(habits: &[Habit]) -> bool {
    let mut seen = vec![false; habits.len()];
    for habit in habits {
        match seen.get_mut(habit.order) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

/// Clamp a requested position into `0..=len`. Negative goes to the front;
/// missing or past-the-end appends.
pub fn clamp_index(target: Option<isize>, len: usize) -> usize {
    match target {
        Some(i) if i < 0 => 0,
        Some(i) if (i as usize) <= len => i as usize,
        _ => len,
    }
}

/// Place `habit` at logical position `target` and renumber.
///
/// The existing records are sorted by `order` first, so callers may pass
/// them in any arrangement. The new record ends with `order` equal to the
/// clamped target; records at or after that position shift down by one.
pub fn insert_at(mut habits: Vec<Habit>, habit: Habit, target: Option<isize>) -> Vec<Habit> {
    sort_by_order(&mut habits);
    let idx = clamp_index(target, habits.len());
    habits.insert(idx, habit);
    reindex(habits)
}

/// Move the habit `id` so that it ends at position `target`.
///
/// `target` is the final position in the result. For a drag-and-drop this is
/// the index the drop target occupied before the move, in either direction.
/// The moved record keeps its identity and content; `updated_at` becomes `now`.
pub fn move_to(
    mut habits: Vec<Habit>,
    id: HabitId,
    target: isize,
    now: DateTime<Utc>,
) -> Result<Vec<Habit>, OrderError> {
    let idx = habits
        .iter()
        .position(|h| h.id == id)
        .ok_or(OrderError::NotFound(id))?;
    let mut habit = habits.remove(idx);
    habit.touch(now);
    Ok(insert_at(habits, habit, Some(target)))
}

/// Drop the habit `id` and renumber what is left, keeping relative order.
pub fn remove_and_reindex(mut habits: Vec<Habit>, id: HabitId) -> Result<Vec<Habit>, OrderError> {
    let idx = habits
        .iter()
        .position(|h| h.id == id)
        .ok_or(OrderError::NotFound(id))?;
    habits.remove(idx);
    sort_by_order(&mut habits);
    Ok(reindex(habits))
}

/// Sort and renumber a collection that may have been edited by hand.
pub fn normalize(mut habits: Vec<Habit>) -> Vec<Habit> {
    sort_by_order(&mut habits);
    reindex(habits)
}
