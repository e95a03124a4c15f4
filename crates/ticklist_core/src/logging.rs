//! File logging for the `ticklist` process.
//!
//! # Responsibility
//! - Start the rotating file logger once, on first request.
//! - Capture panics into the log before the default hook runs.
//!
//! # Invariants
//! - The first successful initialization wins for the process lifetime;
//!   later calls validate their arguments and otherwise do nothing.
//! - Warn and error records are duplicated to stderr.
//! - Every record and panic payload is written as a single line.

use flexi_logger::{
    Cleanup, Criterion, DeferredNow, Duplicate, FileSpec, Logger, LoggerHandle, Naming,
};
use log::{error, info, LevelFilter, Record};
use once_cell::sync::OnceCell;
use std::path::Path;

const LOG_FILE_BASENAME: &str = "ticklist";
const ROTATE_AT_BYTES: u64 = 4 * 1024 * 1024;
const ROTATED_FILES_KEPT: usize = 3;
const PANIC_MESSAGE_MAX_CHARS: usize = 200;

static LOGGER: OnceCell<LoggerHandle> = OnceCell::new();

/// Starts file logging for this process.
///
/// `level` takes the usual `log` level names (`off`, `error`, `warn`, `info`,
/// `debug`, `trace`, any case). Records go to rotating `ticklist_*.log` files
/// under `log_dir`; the directory is created when missing. Once a logger is
/// running, further calls are no-ops, so callers do not have to track whether
/// they already initialized.
///
/// # Errors
/// Returns a printable message when `level` is not a known level name, when
/// `log_dir` cannot be created, or when the logger backend fails to start.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), String> {
    let level = level.trim();
    if level.parse::<LevelFilter>().is_err() {
        return Err(format!("unknown log level {level:?}, expected error|warn|info|debug|trace"));
    }

    LOGGER.get_or_try_init(|| start_logger(level, log_dir))?;
    Ok(())
}

/// Default level for this build: `debug` in debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(level: &str, log_dir: &Path) -> Result<LoggerHandle, String> {
    std::fs::create_dir_all(log_dir)
        .map_err(|err| format!("cannot create log directory {}: {err}", log_dir.display()))?;

    let handle = Logger::try_with_str(level)
        .map_err(|err| format!("unusable log level {level:?}: {err}"))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(ROTATED_FILES_KEPT),
        )
        .append()
        .duplicate_to_stderr(Duplicate::Warn)
        .format(format_record)
        .start()
        .map_err(|err| format!("cannot start file logger: {err}"))?;

    install_panic_hook();
    info!(
        "event=logging_init module=logging status=ok level={level} dir={}",
        log_dir.display()
    );
    Ok(handle)
}

/// One record per line: `2025-06-01T12:00:00.000 INFO  [module] message`.
fn format_record(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {:<5} [{}] {}",
        now.format("%Y-%m-%dT%H:%M:%S%.3f"),
        record.level(),
        record.module_path().unwrap_or("unknown"),
        record.args()
    )
}

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        // Why: payloads are `&str` for literal panics and `String` for
        // formatted ones; anything else carries no message to show.
        let message = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|m| (*m).to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic module=logging status=error location={location} message=\"{}\"",
            flatten_panic_message(&message)
        );
        default_hook(panic_info);
    }));
}

/// Collapses a panic message onto one line and caps its length.
fn flatten_panic_message(message: &str) -> String {
    let mut flat = message.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > PANIC_MESSAGE_MAX_CHARS {
        flat = flat.chars().take(PANIC_MESSAGE_MAX_CHARS).collect();
        flat.push_str("...");
    }
    flat
}
