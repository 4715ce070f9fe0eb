use std::error::Error;
use std::path::PathBuf;

use chrono::Utc;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::io::store::{FileStore, HabitStore};
use crate::logging;
use crate::model::config::Config;
use crate::model::habit::{Habit, HabitId, Rating};
use crate::model::language::Language;
use crate::model::theme::Theme;
use crate::ops::habit_ops::{self, HabitError, HabitUpdate, NewHabit, ValidationError};
use crate::ops::{naming, order};

type CmdResult = Result<(), Box<dyn Error>>;

/// Environment variable naming the data directory
pub const DATA_DIR_ENV: &str = "HABITS_DIR";

/// Everything a command needs: the opened store and the parsed config.
struct Context {
    store: FileStore,
    config: Config,
    json: bool,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let data_dir = resolve_data_dir(cli.data_dir.as_deref());
    let store = FileStore::open(&data_dir)?;
    let config = config_io::read_config(&data_dir)?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log.level);
    if let Err(e) = logging::init_logging(level, &data_dir.join("logs")) {
        eprintln!("warning: logging disabled: {}", e);
    }

    let ctx = Context {
        store,
        config,
        json: cli.json,
    };

    match cli.command.unwrap_or(Commands::List) {
        // Read commands
        Commands::List => cmd_list(&ctx),
        Commands::NextName => cmd_next_name(&ctx),

        // Write commands
        Commands::Add(args) => cmd_add(&ctx, args),
        Commands::Rename(args) => cmd_rename(&ctx, args),
        Commands::Rate(args) => cmd_rate(&ctx, args),
        Commands::Mv(args) => cmd_mv(&ctx, args),
        Commands::Rm(args) => cmd_rm(&ctx, args),
        Commands::Clear(args) => cmd_clear(&ctx, args),

        // Settings
        Commands::Theme(args) => cmd_theme(&ctx, args),
        Commands::Lang(args) => cmd_lang(&ctx, args),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Data directory: explicit flag, then `$HABITS_DIR`, then the platform data
/// directory, then `./.habits`.
pub fn resolve_data_dir(flag: Option<&str>) -> PathBuf {
    if let Some(dir) = flag {
        return PathBuf::from(dir);
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map(|d| d.join("habits"))
        .unwrap_or_else(|| PathBuf::from(".habits"))
}

fn sorted(mut habits: Vec<Habit>) -> Vec<Habit> {
    order::sort_by_order(&mut habits);
    habits
}

fn find(habits: &[Habit], id: HabitId) -> Result<&Habit, HabitError> {
    habits
        .iter()
        .find(|h| h.id == id)
        .ok_or_else(|| HabitError::NotFound(id.to_string()))
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print one habit after a write
fn report(ctx: &Context, verb: &str, habit: &Habit) -> CmdResult {
    if ctx.json {
        return print_json(&habit_to_json(habit));
    }
    println!("{} {}. {}", verb, habit.order + 1, habit.title);
    Ok(())
}

fn parse_rating(s: &str) -> Result<Rating, Box<dyn Error>> {
    Ok(s.parse::<Rating>()?)
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Context) -> CmdResult {
    let habits = sorted(ctx.store.load()?);
    if ctx.json {
        let out: Vec<HabitJson> = habits.iter().map(habit_to_json).collect();
        return print_json(&out);
    }
    print!("{}", format_habit_list(&habits));
    Ok(())
}

fn cmd_next_name(ctx: &Context) -> CmdResult {
    let habits = ctx.store.load()?;
    let title = naming::generate_default_name(&habits, ctx.config.habits.language);
    if ctx.json {
        return print_json(&NameJson { title });
    }
    println!("{}", title);
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Context, args: AddArgs) -> CmdResult {
    let rating = args.rating.as_deref().map(parse_rating).transpose()?;
    let lang = ctx.config.habits.language;
    let now = Utc::now();

    let created = ctx.store.update(|habits| -> Result<_, Box<dyn Error>> {
        let index = if let Some(at) = &args.at {
            Some(habit_ops::parse_position(at)?)
        } else if let Some(above) = &args.above {
            let id = habit_ops::resolve_habit(&habits, above)?;
            Some(find(&habits, id)?.order as isize)
        } else if let Some(below) = &args.below {
            let id = habit_ops::resolve_habit(&habits, below)?;
            Some(find(&habits, id)?.order as isize + 1)
        } else {
            None
        };

        let new = NewHabit {
            title: args.title.clone(),
            rating,
        };
        let (habits, id) = habit_ops::create_habit(habits, new, index, lang, now)?;
        let created = find(&habits, id)?.clone();
        Ok((habits, created))
    })?;

    log::info!(
        "event=habit_created module=cli status=ok id={} position={}",
        created.id,
        created.order
    );
    report(ctx, "Added", &created)
}

fn cmd_rename(ctx: &Context, args: RenameArgs) -> CmdResult {
    if args.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle.into());
    }
    let updated = apply_update(
        ctx,
        &args.habit,
        HabitUpdate {
            title: Some(args.title),
            rating: None,
        },
    )?;
    log::info!(
        "event=habit_renamed module=cli status=ok id={}",
        updated.id
    );
    report(ctx, "Renamed", &updated)
}

fn cmd_rate(ctx: &Context, args: RateArgs) -> CmdResult {
    let rating = parse_rating(&args.rating)?;
    let updated = apply_update(
        ctx,
        &args.habit,
        HabitUpdate {
            title: None,
            rating: Some(rating),
        },
    )?;
    log::info!(
        "event=habit_rated module=cli status=ok id={} rating={}",
        updated.id,
        updated.rating
    );
    report(ctx, "Rated", &updated)
}

fn apply_update(ctx: &Context, query: &str, update: HabitUpdate) -> Result<Habit, Box<dyn Error>> {
    let now = Utc::now();
    ctx.store.update(|habits| -> Result<_, Box<dyn Error>> {
        let id = habit_ops::resolve_habit(&habits, query)?;
        let habits = habit_ops::update_habit(habits, id, update, now)?;
        let updated = find(&habits, id)?.clone();
        Ok((habits, updated))
    })
}

/// Where `mv` should put the habit
enum MoveTarget {
    Index(isize),
    Onto(String),
}

fn cmd_mv(ctx: &Context, args: MvArgs) -> CmdResult {
    let target = if let Some(pos) = &args.position {
        MoveTarget::Index(habit_ops::parse_position(pos)?)
    } else if args.top {
        MoveTarget::Index(0)
    } else if args.bottom {
        MoveTarget::Index(isize::MAX)
    } else if let Some(onto) = args.onto.clone() {
        MoveTarget::Onto(onto)
    } else {
        return Err("specify a position, --top, --bottom or --onto".into());
    };
    let now = Utc::now();

    let moved = ctx.store.update(|habits| -> Result<_, Box<dyn Error>> {
        let id = habit_ops::resolve_habit(&habits, &args.habit)?;
        let habits = match &target {
            MoveTarget::Index(i) => habit_ops::move_habit(habits, id, *i, now)?,
            MoveTarget::Onto(query) => {
                let over = habit_ops::resolve_habit(&habits, query)?;
                habit_ops::drop_habit_onto(habits, id, over, now)?
            }
        };
        let moved = find(&habits, id)?.clone();
        Ok((habits, moved))
    })?;

    log::info!(
        "event=habit_moved module=cli status=ok id={} position={}",
        moved.id,
        moved.order
    );
    report(ctx, "Moved to", &moved)
}

fn cmd_rm(ctx: &Context, args: RmArgs) -> CmdResult {
    let removed = ctx.store.update(|habits| -> Result<_, Box<dyn Error>> {
        let id = habit_ops::resolve_habit(&habits, &args.habit)?;
        let removed = find(&habits, id)?.clone();
        let habits = habit_ops::delete_habit(habits, id)?;
        Ok((habits, removed))
    })?;

    recovery::log_recovery(
        ctx.store.data_dir(),
        RecoveryEntry::new(RecoveryCategory::Delete, format!("habit {} deleted", removed.id))
            .field("Title", removed.title.clone())
            .body(serde_json::to_string_pretty(&removed)?),
    );
    log::info!(
        "event=habit_deleted module=cli status=ok id={}",
        removed.id
    );
    if ctx.json {
        return print_json(&habit_to_json(&removed));
    }
    println!("Deleted {}", removed.title);
    Ok(())
}

fn cmd_clear(ctx: &Context, args: ClearArgs) -> CmdResult {
    if !args.yes {
        return Err("refusing to delete all habits without --yes".into());
    }
    let removed = ctx
        .store
        .update(|habits| -> Result<_, Box<dyn Error>> { Ok((habit_ops::clear_habits(), habits)) })?;

    if !removed.is_empty() {
        recovery::log_recovery(
            ctx.store.data_dir(),
            RecoveryEntry::new(
                RecoveryCategory::Delete,
                format!("{} habits cleared", removed.len()),
            )
            .body(serde_json::to_string_pretty(&sorted(removed.clone()))?),
        );
    }
    log::info!(
        "event=habits_cleared module=cli status=ok count={}",
        removed.len()
    );
    if ctx.json {
        return print_json(&serde_json::json!({ "deleted": removed.len() }));
    }
    println!("Deleted {} habits", removed.len());
    Ok(())
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

fn cmd_theme(ctx: &Context, args: ThemeArgs) -> CmdResult {
    let stored = ctx.store.load_theme();
    let current = stored.unwrap_or(ctx.config.ui.default_theme);

    let Some(value) = args.value else {
        if ctx.json {
            return print_json(&ThemeJson {
                theme: current,
                default: stored.is_none(),
            });
        }
        println!("{}", current);
        return Ok(());
    };

    let next = if value.trim().eq_ignore_ascii_case("toggle") {
        current.toggled()
    } else {
        value.parse::<Theme>()?
    };
    ctx.store.save_theme(next)?;
    log::info!("event=theme_set module=cli status=ok theme={}", next);

    if ctx.json {
        return print_json(&ThemeJson {
            theme: next,
            default: false,
        });
    }
    println!("{}", next);
    Ok(())
}

fn cmd_lang(ctx: &Context, args: LangArgs) -> CmdResult {
    let lang = match args.tag {
        Some(tag) => {
            let lang = tag.parse::<Language>()?;
            config_io::set_language(ctx.store.data_dir(), lang)?;
            log::info!("event=language_set module=cli status=ok language={}", lang);
            lang
        }
        None => ctx.config.habits.language,
    };

    if ctx.json {
        return print_json(&LangJson {
            language: lang,
            template: lang.new_habit_template(),
        });
    }
    println!("{}", lang);
    Ok(())
}
