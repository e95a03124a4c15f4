//! Command-line frontend for the task list.
//!
//! # Responsibility
//! - Map subcommands onto core store and account operations.
//! - Own path resolution for the mirror database and log directory.
//!
//! # Invariants
//! - All state changes go through `ticklist_core`; this binary never
//!   touches the mirror schema directly.
//! - When a session is active, commands operate on that account's
//!   collection; otherwise on the shared anonymous one.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use ticklist_core::{
    default_log_level, init_logging, now_epoch_ms, AuthService, Priority, SqliteStorage,
    StatusFilter, Task, TaskDraft, TaskFilter, TaskId, TaskPatch, TaskStore, UserId,
};

const DB_FILE_NAME: &str = "ticklist.db";
const DB_PATH_ENV: &str = "TICKLIST_DB_PATH";

#[derive(Parser)]
#[command(name = "ticklist")]
#[command(version)]
#[command(about = "Local task list backed by a durable storage mirror")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task to the top of the list
    Add {
        /// Task title
        title: String,
        /// Free-form detail text
        #[arg(long)]
        notes: Option<String>,
        /// Urgency: low, medium or high
        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,
        /// Due date, YYYY-MM-DD (counts as end of that day, UTC)
        #[arg(long, value_parser = parse_due)]
        due: Option<i64>,
    },
    /// List tasks, optionally filtered
    List {
        /// Which slice to show: all, active or completed
        #[arg(long, default_value = "all", value_parser = parse_status)]
        status: StatusFilter,
        /// Case-insensitive title search
        #[arg(long)]
        search: Option<String>,
    },
    /// Toggle a task between done and open
    Done {
        /// Task id, or a unique prefix of one
        id: String,
    },
    /// Edit fields of an existing task
    Edit {
        /// Task id, or a unique prefix of one
        id: String,
        /// New title (blank is ignored)
        #[arg(long)]
        title: Option<String>,
        /// New detail text (blank clears it)
        #[arg(long)]
        notes: Option<String>,
        /// New urgency: low, medium or high
        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,
        /// New due date, YYYY-MM-DD
        #[arg(long, value_parser = parse_due)]
        due: Option<i64>,
    },
    /// Remove a task
    Rm {
        /// Task id, or a unique prefix of one
        id: String,
    },
    /// Remove every completed task
    Clear,
    /// Search titles (shorthand for `list --search`)
    Find {
        /// Case-insensitive title search term
        term: String,
    },
    /// Show counts for the active collection
    Stats,
    /// Create an account and sign in
    Register {
        name: String,
        email: String,
        password: String,
    },
    /// Sign in with an existing account
    Login { email: String, password: String },
    /// Sign out
    Logout,
    /// Show the signed-in account
    Whoami,
}

struct AppPaths {
    db_file: PathBuf,
    log_dir: PathBuf,
}

impl AppPaths {
    /// Resolves storage locations, honoring the `TICKLIST_DB_PATH` override.
    fn resolve() -> Self {
        let base = dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("ticklist");
        let db_file = match std::env::var(DB_PATH_ENV) {
            Ok(raw) if !raw.trim().is_empty() => PathBuf::from(raw.trim()),
            _ => base.join(DB_FILE_NAME),
        };
        AppPaths {
            db_file,
            log_dir: base.join("logs"),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let paths = AppPaths::resolve();

    // A broken log setup must not take the tool down with it.
    if let Err(err) = init_logging(default_log_level(), &paths.log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }

    match run(cli.command, &paths) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, paths: &AppPaths) -> Result<(), String> {
    if let Some(parent) = paths.db_file.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let mut storage = SqliteStorage::open(&paths.db_file)
        .map_err(|err| format!("cannot open mirror at `{}`: {err}", paths.db_file.display()))?;

    match command {
        Commands::Add {
            title,
            notes,
            priority,
            due,
        } => cmd_add(&mut storage, &title, notes, priority, due),
        Commands::List { status, search } => cmd_list(&mut storage, status, search),
        Commands::Done { id } => cmd_done(&mut storage, &id),
        Commands::Edit {
            id,
            title,
            notes,
            priority,
            due,
        } => cmd_edit(&mut storage, &id, title, notes, priority, due),
        Commands::Rm { id } => cmd_rm(&mut storage, &id),
        Commands::Clear => cmd_clear(&mut storage),
        Commands::Find { term } => cmd_list(&mut storage, StatusFilter::All, Some(term)),
        Commands::Stats => cmd_stats(&mut storage),
        Commands::Register {
            name,
            email,
            password,
        } => cmd_register(&mut storage, &name, &email, &password),
        Commands::Login { email, password } => cmd_login(&mut storage, &email, &password),
        Commands::Logout => cmd_logout(&mut storage),
        Commands::Whoami => cmd_whoami(&mut storage),
    }
}

fn cmd_add(
    storage: &mut SqliteStorage,
    title: &str,
    notes: Option<String>,
    priority: Option<Priority>,
    due: Option<i64>,
) -> Result<(), String> {
    let owner = session_owner(storage)?;
    let mut store = TaskStore::load(storage, owner);
    let draft = TaskDraft {
        description: notes,
        priority,
        deadline: due,
    };
    match store.add(title, draft) {
        Some(id) => println!("added {}  {}", short_id(id), title.trim()),
        None => println!("nothing to add: empty title"),
    }
    Ok(())
}

fn cmd_list(
    storage: &mut SqliteStorage,
    status: StatusFilter,
    search: Option<String>,
) -> Result<(), String> {
    let owner = session_owner(storage)?;
    let store = TaskStore::load(storage, owner);
    let filter = TaskFilter { status, search };
    let now = now_epoch_ms();

    let tasks = store.filter(&filter);
    if tasks.is_empty() {
        println!("no tasks.");
        return Ok(());
    }
    for task in tasks {
        println!("{}", render_task(task, now));
    }
    Ok(())
}

fn cmd_done(storage: &mut SqliteStorage, id_prefix: &str) -> Result<(), String> {
    let owner = session_owner(storage)?;
    let mut store = TaskStore::load(storage, owner);
    let id = resolve_task_id(&store, id_prefix)?;

    store.toggle_complete(id);
    if let Some(task) = store.get(id) {
        let state = if task.completed { "completed" } else { "reopened" };
        println!("{state} {}  {}", short_id(id), task.title);
    }
    Ok(())
}

fn cmd_edit(
    storage: &mut SqliteStorage,
    id_prefix: &str,
    title: Option<String>,
    notes: Option<String>,
    priority: Option<Priority>,
    due: Option<i64>,
) -> Result<(), String> {
    let owner = session_owner(storage)?;
    let mut store = TaskStore::load(storage, owner);
    let id = resolve_task_id(&store, id_prefix)?;

    let patch = TaskPatch {
        title,
        description: notes,
        priority,
        deadline: due,
    };
    if patch.is_empty() {
        println!("nothing to change");
        return Ok(());
    }
    store.update(id, patch);
    if let Some(task) = store.get(id) {
        println!("updated {}", short_id(id));
        println!("{}", render_task(task, now_epoch_ms()));
    }
    Ok(())
}

fn cmd_rm(storage: &mut SqliteStorage, id_prefix: &str) -> Result<(), String> {
    let owner = session_owner(storage)?;
    let mut store = TaskStore::load(storage, owner);
    let id = resolve_task_id(&store, id_prefix)?;

    store.remove(id);
    println!("removed {}", short_id(id));
    Ok(())
}

fn cmd_clear(storage: &mut SqliteStorage) -> Result<(), String> {
    let owner = session_owner(storage)?;
    let mut store = TaskStore::load(storage, owner);

    let removed = store.clear_completed();
    println!("cleared {removed} completed task(s)");
    Ok(())
}

fn cmd_stats(storage: &mut SqliteStorage) -> Result<(), String> {
    let owner = session_owner(storage)?;
    let store = TaskStore::load(storage, owner);
    let now = now_epoch_ms();
    let overdue = store
        .tasks()
        .iter()
        .filter(|task| task.is_overdue(now))
        .count();

    println!("total: {}", store.len());
    println!("active: {}", store.active_count());
    println!("completed: {}", store.completed_count());
    println!("overdue: {overdue}");
    Ok(())
}

fn cmd_register(
    storage: &mut SqliteStorage,
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), String> {
    let mut auth = AuthService::new(storage);
    let user = auth
        .register(name, email, password)
        .map_err(|err| err.to_string())?;
    println!("registered {} <{}>", user.name, user.email);
    println!("signed in as {}", user.email);
    Ok(())
}

fn cmd_login(storage: &mut SqliteStorage, email: &str, password: &str) -> Result<(), String> {
    let mut auth = AuthService::new(storage);
    let user = auth
        .login(email, password)
        .map_err(|err| err.to_string())?;
    println!("signed in as {}", user.email);
    Ok(())
}

fn cmd_logout(storage: &mut SqliteStorage) -> Result<(), String> {
    let mut auth = AuthService::new(storage);
    auth.logout().map_err(|err| err.to_string())?;
    println!("signed out");
    Ok(())
}

fn cmd_whoami(storage: &mut SqliteStorage) -> Result<(), String> {
    let auth = AuthService::new(storage);
    match auth.current_user().map_err(|err| err.to_string())? {
        Some(user) => println!("{} <{}>  id={}", user.name, user.email, short_id(user.id)),
        None => println!("not signed in"),
    }
    Ok(())
}

/// Returns the signed-in account id, if any, to key the task collection.
fn session_owner(storage: &mut SqliteStorage) -> Result<Option<UserId>, String> {
    AuthService::new(storage)
        .current_user()
        .map(|user| user.map(|account| account.id))
        .map_err(|err| err.to_string())
}

/// Resolves a full id or unique prefix against the loaded collection.
fn resolve_task_id(
    store: &TaskStore<'_, SqliteStorage>,
    prefix: &str,
) -> Result<TaskId, String> {
    let needle = prefix.trim().replace('-', "").to_ascii_lowercase();
    if needle.is_empty() {
        return Err("empty task id".to_string());
    }

    let matches: Vec<TaskId> = store
        .tasks()
        .iter()
        .filter(|task| task.id.simple().to_string().starts_with(&needle))
        .map(|task| task.id)
        .collect();
    match matches.as_slice() {
        [] => Err(format!("no task matches id `{prefix}`")),
        [id] => Ok(*id),
        more => Err(format!(
            "id `{prefix}` is ambiguous ({} tasks match)",
            more.len()
        )),
    }
}

fn render_task(task: &Task, now_ms: i64) -> String {
    let mark = if task.completed { "x" } else { " " };
    let mut line = format!("[{mark}] {}  {}", short_id(task.id), task.title);
    if let Some(priority) = task.priority {
        line.push_str(&format!("  [{}]", priority.as_str()));
    }
    if let Some(deadline) = task.deadline {
        line.push_str(&format!("  (due {})", format_day(deadline)));
        if task.is_overdue(now_ms) {
            line.push_str("  OVERDUE");
        }
    }
    if let Some(notes) = &task.description {
        line.push_str("\n        ");
        line.push_str(notes);
    }
    line
}

fn short_id(id: TaskId) -> String {
    let full = id.simple().to_string();
    full[..8].to_string()
}

fn format_day(epoch_ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(epoch_ms) {
        Some(instant) => instant.format("%Y-%m-%d").to_string(),
        None => format!("{epoch_ms}ms"),
    }
}

fn parse_priority(value: &str) -> Result<Priority, String> {
    Priority::parse(value).ok_or_else(|| format!("expected low|medium|high, got `{value}`"))
}

fn parse_status(value: &str) -> Result<StatusFilter, String> {
    StatusFilter::parse(value)
        .ok_or_else(|| format!("expected all|active|completed, got `{value}`"))
}

/// Parses `YYYY-MM-DD` into end-of-day epoch milliseconds (UTC).
fn parse_due(value: &str) -> Result<i64, String> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|err| format!("invalid date `{value}`: {err} (expected YYYY-MM-DD)"))?;
    let end_of_day = date
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| format!("invalid date `{value}`"))?;
    Ok(end_of_day.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::{format_day, parse_due, parse_priority, parse_status, render_task, short_id};
    use ticklist_core::{Priority, StatusFilter, Task};

    #[test]
    fn parse_due_accepts_iso_dates() {
        let millis = parse_due("2026-03-01").unwrap();
        assert_eq!(format_day(millis), "2026-03-01");

        assert!(parse_due("01/03/2026").is_err());
        assert!(parse_due("2026-13-40").is_err());
    }

    #[test]
    fn parse_priority_and_status_reject_unknown_values() {
        assert_eq!(parse_priority("High").unwrap(), Priority::High);
        assert!(parse_priority("urgent").is_err());
        assert_eq!(parse_status("Active").unwrap(), StatusFilter::Active);
        assert!(parse_status("open").is_err());
    }

    #[test]
    fn short_id_is_eight_hex_chars() {
        let task = Task::new("x");
        let short = short_id(task.id);
        assert_eq!(short.len(), 8);
        assert!(short.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn render_task_shows_state_and_metadata() {
        let mut task = Task::new("Buy milk");
        task.priority = Some(Priority::High);
        task.deadline = Some(parse_due("2020-01-01").unwrap());

        let line = render_task(&task, parse_due("2021-01-01").unwrap());
        assert!(line.starts_with("[ ] "));
        assert!(line.contains("Buy milk"));
        assert!(line.contains("[high]"));
        assert!(line.contains("(due 2020-01-01)"));
        assert!(line.contains("OVERDUE"));

        task.completed = true;
        let line = render_task(&task, 0);
        assert!(line.starts_with("[x] "));
        assert!(!line.contains("OVERDUE"));
    }
}
