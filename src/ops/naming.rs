//! Default names for new habits.
//!
//! A fresh habit is called `<template> <n>`, where `<template>` depends on the
//! working language and `n` is the lowest positive integer not already taken
//! by a title of that exact shape.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::habit::Habit;
use crate::model::language::Language;

/// One anchored, case-insensitive matcher per language:
/// `^<template>\s+([0-9]+)$`
static NUMBERED_TITLE: LazyLock<HashMap<Language, Regex>> = LazyLock::new(|| {
    Language::ALL
        .iter()
        .map(|&lang| {
            let pattern = format!(
                r"(?i)^{}\s+([0-9]+)$",
                regex::escape(lang.new_habit_template())
            );
            let re = Regex::new(&pattern).expect("escaped template is a valid pattern");
            (lang, re)
        })
        .collect()
});

/// Numeric suffix of `title` if it reads `<template> <n>` for `lang`.
///
/// Comparison ignores case and surrounding whitespace. Zero and numbers too
/// large for `u64` do not count.
pub fn numbered_suffix(title: &str, lang: Language) -> Option<u64> {
    let re = NUMBERED_TITLE.get(&lang)?;
    let caps = re.captures(title.trim())?;
    let n: u64 = caps.get(1)?.as_str().parse().ok()?;
    (n > 0).then_some(n)
}

/// Pick the default title for a new habit.
///
/// Only titles built from `lang`'s template are considered; a title using
/// another language's template never occupies a slot.
pub fn generate_default_name(habits: &[Habit], lang: Language) -> String {
    let mut used: Vec<u64> = habits
        .iter()
        .filter_map(|h| numbered_suffix(&h.title, lang))
        .collect();
    used.sort_unstable();
    used.dedup();

    format!("{} {}", lang.new_habit_template(), lowest_free(&used))
}

/// Lowest positive integer absent from `sorted`, which must be ascending
/// and free of duplicates.
fn lowest_free(sorted: &[u64]) -> u64 {
    match sorted.first() {
        None => return 1,
        Some(&first) if first > 1 => return 1,
        Some(_) => {}
    }
    for pair in sorted.windows(2) {
        if pair[1] - pair[0] > 1 {
            return pair[0] + 1;
        }
    }
    sorted.last().map_or(1, |&max| max.saturating_add(1))
}
