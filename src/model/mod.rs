pub mod config;
pub mod habit;
pub mod language;
pub mod theme;

pub use config::*;
pub use habit::*;
pub use language::*;
pub use theme::*;
