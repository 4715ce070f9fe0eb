use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::io::lock::{FileLock, LockError};
use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::model::habit::Habit;
use crate::model::theme::Theme;
use crate::ops::order;

const HABITS_FILE: &str = "habits.json";
const THEME_FILE: &str = "theme";

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize habits: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error(transparent)]
    LockError(#[from] LockError),
}

/// Where the habit collection and theme preference live.
///
/// `load` never fails on malformed content: unreadable data reads as an empty
/// collection. It only fails when the storage itself cannot be read.
pub trait HabitStore {
    fn load(&self) -> Result<Vec<Habit>, StoreError>;
    fn save(&self, habits: &[Habit]) -> Result<(), StoreError>;
    fn load_theme(&self) -> Option<Theme>;
    fn save_theme(&self, theme: Theme) -> Result<(), StoreError>;

    /// Exclusive access for one read-modify-write cycle, if the backend
    /// needs it.
    fn lock(&self) -> Result<Option<FileLock>, StoreError>;

    /// Load, transform, save, all under `lock`. Nothing is saved when `f`
    /// fails.
    fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(Vec<Habit>) -> Result<(Vec<Habit>, T), E>,
        E: From<StoreError>,
    {
        let _guard = self.lock()?;
        let habits = self.load()?;
        let (next, out) = f(habits)?;
        self.save(&next)?;
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Store rooted at a data directory holding `habits.json` and `theme`.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) the data directory.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|e| StoreError::WriteError {
            path: data_dir.clone(),
            source: e,
        })?;
        Ok(FileStore { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn habits_path(&self) -> PathBuf {
        self.data_dir.join(HABITS_FILE)
    }

    pub fn theme_path(&self) -> PathBuf {
        self.data_dir.join(THEME_FILE)
    }
}

impl HabitStore for FileStore {
    fn load(&self) -> Result<Vec<Habit>, StoreError> {
        let path = self.habits_path();
        let text = match fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::ReadError { path, source: e }),
        };
        Ok(parse_habits(&self.data_dir, &text))
    }

    fn save(&self, habits: &[Habit]) -> Result<(), StoreError> {
        let mut sorted = habits.to_vec();
        order::sort_by_order(&mut sorted);
        let content = serde_json::to_string_pretty(&sorted)?;

        let path = self.habits_path();
        if let Err(e) = recovery::atomic_write(&path, content.as_bytes()) {
            recovery::log_recovery(
                &self.data_dir,
                RecoveryEntry::new(RecoveryCategory::Write, "habits write failed")
                    .field("Target", HABITS_FILE)
                    .field("Error", e.to_string())
                    .body(content),
            );
            return Err(StoreError::WriteError { path, source: e });
        }
        log::debug!(
            "event=habits_saved module=store status=ok count={}",
            sorted.len()
        );
        Ok(())
    }

    fn load_theme(&self) -> Option<Theme> {
        let text = fs::read_to_string(self.theme_path()).ok()?;
        Theme::from_stored(&text)
    }

    fn save_theme(&self, theme: Theme) -> Result<(), StoreError> {
        let path = self.theme_path();
        recovery::atomic_write(&path, theme.as_str().as_bytes())
            .map_err(|e| StoreError::WriteError { path, source: e })
    }

    fn lock(&self) -> Result<Option<FileLock>, StoreError> {
        Ok(Some(FileLock::acquire_default(&self.data_dir)?))
    }
}

/// Decode stored habits. Malformed content yields an empty collection and a
/// copy of the raw text in the recovery log; gapped or duplicated `order`
/// values are renumbered, and duplicated ids after the first are replaced.
fn parse_habits(data_dir: &Path, text: &str) -> Vec<Habit> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<Habit>>(text).map(reassign_duplicate_ids) {
        Ok(habits) if order::is_contiguous(&habits) => habits,
        Ok(habits) => {
            log::warn!(
                "event=habits_renumbered module=store status=ok count={}",
                habits.len()
            );
            order::normalize(habits)
        }
        Err(e) => {
            log::warn!(
                "event=habits_parse_failed module=store status=error error={}",
                e
            );
            recovery::log_recovery(
                data_dir,
                RecoveryEntry::new(RecoveryCategory::Parser, "habits.json unreadable")
                    .field("Source", HABITS_FILE)
                    .field("Error", e.to_string())
                    .body(text),
            );
            Vec::new()
        }
    }
}

/// Give every record after the first that shares an `id` a fresh one.
fn reassign_duplicate_ids(mut habits: Vec<Habit>) -> Vec<Habit> {
    let mut seen = HashSet::with_capacity(habits.len());
    for habit in &mut habits {
        if !seen.insert(habit.id) {
            let fresh = Uuid::new_v4();
            log::warn!(
                "event=habit_id_reassigned module=store status=ok old_id={} new_id={}",
                habit.id,
                fresh
            );
            habit.id = fresh;
            seen.insert(fresh);
        }
    }
    habits
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Store kept in memory; for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    habits: RefCell<Vec<Habit>>,
    theme: RefCell<Option<Theme>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HabitStore for MemoryStore {
    fn load(&self) -> Result<Vec<Habit>, StoreError> {
        Ok(self.habits.borrow().clone())
    }

    fn save(&self, habits: &[Habit]) -> Result<(), StoreError> {
        *self.habits.borrow_mut() = habits.to_vec();
        Ok(())
    }

    fn load_theme(&self) -> Option<Theme> {
        *self.theme.borrow()
    }

    fn save_theme(&self, theme: Theme) -> Result<(), StoreError> {
        *self.theme.borrow_mut() = Some(theme);
        Ok(())
    }

    fn lock(&self) -> Result<Option<FileLock>, StoreError> {
        Ok(None)
    }
}
