use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hb", about = concat!("hb v", env!("CARGO_PKG_VERSION"), " - a short list of habits worth keeping"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory (default: $HABITS_DIR, then the platform data dir)
    #[arg(short = 'D', long = "data-dir", global = true)]
    pub data_dir: Option<String>,

    /// Log level for this run (trace, debug, info, warn, error, off)
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List habits in order
    List,
    /// Add a habit (default title: the next free "My new atomic habit N")
    Add(AddArgs),
    /// Change a habit's title
    Rename(RenameArgs),
    /// Rate a habit: plus, neutral or minus
    Rate(RateArgs),
    /// Move a habit to another position
    Mv(MvArgs),
    /// Delete a habit
    Rm(RmArgs),
    /// Delete all habits
    Clear(ClearArgs),
    /// Show, set or toggle the color theme
    Theme(ThemeArgs),
    /// Show or set the language used for default names
    Lang(LangArgs),
    /// Print the default title the next `add` would use
    NextName,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Habit title (omit to use the next default name)
    pub title: Option<String>,
    /// 1-based position to insert at (default: end of list)
    #[arg(long, conflicts_with_all = ["above", "below"])]
    pub at: Option<String>,
    /// Insert directly above this habit
    #[arg(long, conflicts_with = "below")]
    pub above: Option<String>,
    /// Insert directly below this habit
    #[arg(long)]
    pub below: Option<String>,
    /// Initial rating
    #[arg(long, short)]
    pub rating: Option<String>,
}

#[derive(Args)]
pub struct RenameArgs {
    /// Habit: position, id (or prefix), or title. A number is read as a
    /// position before it is tried as a title
    pub habit: String,
    /// New title
    pub title: String,
}

#[derive(Args)]
pub struct RateArgs {
    /// Habit: position, id (or prefix), or title. A number is read as a
    /// position before it is tried as a title
    pub habit: String,
    /// plus | neutral | minus
    pub rating: String,
}

#[derive(Args)]
pub struct MvArgs {
    /// Habit: position, id (or prefix), or title. A number is read as a
    /// position before it is tried as a title
    pub habit: String,
    /// 1-based target position
    #[arg(conflicts_with_all = ["top", "bottom", "onto"])]
    pub position: Option<String>,
    /// Move to the top
    #[arg(long, conflicts_with_all = ["bottom", "onto"])]
    pub top: bool,
    /// Move to the bottom
    #[arg(long, conflicts_with = "onto")]
    pub bottom: bool,
    /// Take the place of another habit, as when dropping onto it
    #[arg(long)]
    pub onto: Option<String>,
}

#[derive(Args)]
pub struct RmArgs {
    /// Habit: position, id (or prefix), or title. A number is read as a
    /// position before it is tried as a title
    pub habit: String,
}

#[derive(Args)]
pub struct ClearArgs {
    /// Confirm deleting every habit
    #[arg(long)]
    pub yes: bool,
}

// ---------------------------------------------------------------------------
// Settings args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ThemeArgs {
    /// light, dark or toggle (omit to show the current theme)
    pub value: Option<String>,
}

#[derive(Args)]
pub struct LangArgs {
    /// Language tag such as en or ru (omit to show the current language)
    pub tag: Option<String>,
}
