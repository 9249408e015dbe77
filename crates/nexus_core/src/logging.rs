//! Rolling file logs for the CRM core.
//!
//! # Responsibility
//! - Start the `flexi_logger` file backend once per process.
//! - Capture panics as sanitized `panic_captured` events.
//!
//! # Invariants
//! - Repeated init with the same level and directory is a no-op.
//! - Any other re-init is rejected with an error string.
//! - Log lines carry ids and counters only; never names, emails or
//!   message bodies.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, LogSpecification, Logger, LoggerHandle, Naming, WriteMode,
};
use log::LevelFilter;
use once_cell::sync::OnceCell;
use std::panic::PanicHookInfo;
use std::path::{Path, PathBuf};

const FILE_BASENAME: &str = "nexus_crm";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_FILES: usize = 5;
const PANIC_TEXT_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Validated `(level, directory)` pair requested by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogTarget {
    level: LevelFilter,
    dir: PathBuf,
}

impl LogTarget {
    fn parse(level: &str, dir: &str) -> Result<Self, String> {
        Ok(Self {
            level: parse_level(level)?,
            dir: parse_dir(dir)?,
        })
    }

    fn conflict_with(&self, requested: &LogTarget) -> Option<String> {
        if self.dir != requested.dir {
            return Some(format!(
                "log sink is fixed at `{}`; cannot move it to `{}`",
                self.dir.display(),
                requested.dir.display()
            ));
        }
        if self.level != requested.level {
            return Some(format!(
                "log level is fixed at `{}`; cannot change it to `{}`",
                level_name(self.level),
                level_name(requested.level)
            ));
        }
        None
    }
}

struct ActiveLogger {
    target: LogTarget,
    _handle: LoggerHandle,
}

/// Starts file logging at `level` under `log_dir`.
///
/// # Errors
/// - `level` is not one of trace/debug/info/warn/error.
/// - `log_dir` is blank, relative, or cannot be created.
/// - Logging is already active with a different level or directory.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let requested = LogTarget::parse(level, log_dir)?;
    let active = ACTIVE.get_or_try_init(|| ActiveLogger::start(requested.clone()))?;
    match active.target.conflict_with(&requested) {
        Some(conflict) => Err(conflict),
        None => Ok(()),
    }
}

/// Active `(level, log_dir)`, or `None` before [`init_logging`].
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (level_name(active.target.level), active.target.dir.clone()))
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> &'static str {
    level_name(default_filter())
}

impl ActiveLogger {
    fn start(target: LogTarget) -> Result<Self, String> {
        std::fs::create_dir_all(&target.dir)
            .map_err(|err| format!("cannot prepare log dir `{}`: {err}", target.dir.display()))?;

        let spec = LogSpecification::builder().default(target.level).build();
        let handle = Logger::with(spec)
            .log_to_file(FileSpec::default().directory(&target.dir).basename(FILE_BASENAME))
            .rotate(
                Criterion::Size(ROTATE_AT_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(KEEP_FILES),
            )
            .write_mode(WriteMode::BufferAndFlush)
            .append()
            .format_for_files(flexi_logger::detailed_format)
            .start()
            .map_err(|err| format!("log backend refused to start: {err}"))?;

        PANIC_HOOK.get_or_init(install_panic_hook);

        log::info!(
            "event=core_start module=core status=ok os={} profile={} version={}",
            std::env::consts::OS,
            if cfg!(debug_assertions) { "debug" } else { "release" },
            env!("CARGO_PKG_VERSION")
        );
        log::info!(
            "event=logging_init module=core status=ok level={} rotate_bytes={ROTATE_AT_BYTES} keep={KEEP_FILES}",
            level_name(target.level)
        );

        Ok(Self {
            target,
            _handle: handle,
        })
    }
}

fn default_filter() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

fn parse_level(raw: &str) -> Result<LevelFilter, String> {
    let lowered = raw.trim().to_ascii_lowercase();
    let filter = match lowered.as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" | "warning" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => {
            return Err(format!(
                "unknown log level `{lowered}` (use trace, debug, info, warn or error)"
            ))
        }
    };
    Ok(filter)
}

fn level_name(filter: LevelFilter) -> &'static str {
    match filter {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}

fn parse_dir(raw: &str) -> Result<PathBuf, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("log dir is empty".to_string());
    }
    let dir = Path::new(raw);
    if dir.is_relative() {
        return Err(format!("log dir `{raw}` is not absolute"));
    }
    Ok(dir.to_path_buf())
}

fn install_panic_hook() {
    let chained = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let at = info
            .location()
            .map(|location| format!("{}:{}", location.file(), location.line()))
            .unwrap_or_else(|| "unknown".to_string());
        log::error!(
            "event=panic_captured module=core status=error location={at} payload={}",
            flatten(&panic_text(info), PANIC_TEXT_LIMIT)
        );
        chained(info);
    }));
}

fn panic_text(info: &PanicHookInfo<'_>) -> String {
    if let Some(text) = info.payload().downcast_ref::<&str>() {
        return (*text).to_string();
    }
    match info.payload().downcast_ref::<String>() {
        Some(text) => text.clone(),
        None => "<opaque payload>".to_string(),
    }
}

/// Collapses line breaks and truncates to `limit` chars, marking the cut.
fn flatten(text: &str, limit: usize) -> String {
    let mut out = String::with_capacity(limit.min(text.len()) + 3);
    for (taken, ch) in text.chars().enumerate() {
        if taken == limit {
            out.push_str("...");
            break;
        }
        out.push(if ch == '\n' || ch == '\r' { ' ' } else { ch });
    }
    out
}
