//! Ordered habit list with ratings, persisted in a local data directory.
//!
//! `ops::order` and `ops::naming` are pure functions over a `Vec<Habit>`;
//! `ops::habit_ops` validates input before handing it to them, and
//! `io::store` loads and saves the collection.

pub mod cli;
pub mod io;
pub mod logging;
pub mod model;
pub mod ops;
pub mod util;
