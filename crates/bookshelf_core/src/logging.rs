//! Process logging bootstrap.
//!
//! # Responsibility
//! - Start one rolling file logger per process behind the `log` facade.
//! - Capture panics as sanitized log events.
//!
//! # Invariants
//! - Initialization never panics and is idempotent for identical settings.
//! - A second initialization with a different level or directory fails.
//! - Core events are single-line `key=value` records carrying ids, counts
//!   and durations only; person names and book titles are never logged.

use crate::config::CoreConfig;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const LOG_FILE_BASENAME: &str = "bookshelf";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Validated logger settings.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    level: LevelFilter,
    log_dir: PathBuf,
}

impl LogSettings {
    fn new(level: &str, log_dir: &Path) -> Result<Self, String> {
        let level = LevelFilter::from_str(level.trim()).map_err(|_| {
            format!("unsupported log level `{level}`; expected off|error|warn|info|debug|trace")
        })?;
        if log_dir.as_os_str().is_empty() {
            return Err("log_dir cannot be empty".to_string());
        }
        if !log_dir.is_absolute() {
            return Err(format!(
                "log_dir must be an absolute path, got `{}`",
                log_dir.display()
            ));
        }

        Ok(Self {
            level,
            log_dir: log_dir.to_path_buf(),
        })
    }

    /// `None` when `config` leaves file logging off.
    fn from_config(config: &CoreConfig) -> Result<Option<Self>, String> {
        config
            .log_dir
            .as_deref()
            .map(|dir| Self::new(&config.log_level, dir))
            .transpose()
    }
}

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

impl ActiveLogger {
    fn ensure_same(&self, requested: &LogSettings) -> Result<(), String> {
        let active = &self.settings;
        if active.log_dir != requested.log_dir {
            return Err(format!(
                "logging already writes to `{}`; refusing to switch to `{}`",
                active.log_dir.display(),
                requested.log_dir.display()
            ));
        }
        if active.level != requested.level {
            return Err(format!(
                "logging already runs at `{}`; refusing to switch to `{}`",
                active.level, requested.level
            ));
        }
        Ok(())
    }
}

/// Starts file logging at `level` under the absolute directory `log_dir`.
///
/// # Errors
/// - Unknown level, empty or relative directory.
/// - Directory creation or logger start-up failure.
/// - A logger is already active with a different level or directory.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    start_once(LogSettings::new(level, Path::new(log_dir.trim()))?)
}

/// Starts file logging from `config` when it names a log directory.
///
/// Returns `Ok(false)` when file logging is not configured.
pub fn init_logging_from_config(config: &CoreConfig) -> Result<bool, String> {
    match LogSettings::from_config(config)? {
        Some(settings) => start_once(settings).map(|()| true),
        None => Ok(false),
    }
}

/// `(level, log_dir)` of the active logger, if any.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE_LOGGER.get().map(|active| {
        (
            active.settings.level.as_str(),
            active.settings.log_dir.clone(),
        )
    })
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_once(settings: LogSettings) -> Result<(), String> {
    let active = ACTIVE_LOGGER.get_or_try_init(|| start_logger(settings.clone()))?;
    active.ensure_same(&settings)
}

fn start_logger(settings: LogSettings) -> Result<ActiveLogger, String> {
    let log_dir = settings.log_dir.as_path();
    std::fs::create_dir_all(log_dir).map_err(|err| {
        format!("failed to create log directory `{}`: {err}", log_dir.display())
    })?;

    let handle = Logger::with(settings.level)
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    install_panic_hook();
    info!(
        "event=core_init module=core status=ok level={} version={} platform={}",
        settings.level,
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    );

    Ok(ActiveLogger {
        settings,
        _handle: handle,
    })
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("non-string panic payload");
        error!("{}", panic_event(&location, payload));
        previous(info);
    }));
}

/// One-line panic record: first payload line only, capped in length.
fn panic_event(location: &str, payload: &str) -> String {
    let mut lines = payload.lines();
    let first = lines.next().unwrap_or_default();
    let mut summary: String = first.chars().take(PANIC_PAYLOAD_LIMIT).collect();
    if summary.len() < first.len() || lines.next().is_some() {
        summary.push_str("...");
    }
    format!("event=panic_captured module=core status=error location={location} payload={summary}")
}

#[cfg(test)]
mod tests {
    use super::{
        init_logging, init_logging_from_config, logging_status, panic_event, LogSettings,
        PANIC_PAYLOAD_LIMIT,
    };
    use crate::config::CoreConfig;
    use log::LevelFilter;
    use std::path::Path;

    #[test]
    fn settings_accept_known_levels_and_absolute_dirs() {
        let dir = std::env::temp_dir();
        let settings = LogSettings::new(" WARN ", &dir).unwrap();
        assert_eq!(settings.level, LevelFilter::Warn);
        assert_eq!(settings.log_dir, dir);

        assert!(LogSettings::new("loud", &dir).unwrap_err().contains("unsupported"));
        assert!(LogSettings::new("info", Path::new("logs/dev"))
            .unwrap_err()
            .contains("absolute"));
        assert!(LogSettings::new("info", Path::new("")).unwrap_err().contains("empty"));
    }

    #[test]
    fn config_without_log_dir_leaves_logging_off() {
        let config = CoreConfig::default();
        assert_eq!(LogSettings::from_config(&config).unwrap(), None);
        assert!(!init_logging_from_config(&config).unwrap());
    }

    #[test]
    fn panic_event_keeps_first_line_and_caps_length() {
        let event = panic_event("src/lib.rs:7", "boom\nstack detail");
        assert!(event.ends_with("location=src/lib.rs:7 payload=boom..."));

        let long = "x".repeat(PANIC_PAYLOAD_LIMIT * 2);
        let event = panic_event("here", &long);
        let payload = event.rsplit("payload=").next().unwrap();
        assert_eq!(payload.len(), PANIC_PAYLOAD_LIMIT + 3);
        assert!(!event.contains('\n'));
    }

    #[test]
    fn config_driven_start_is_idempotent_and_rejects_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig {
            log_level: "info".to_string(),
            log_dir: Some(dir.path().to_path_buf()),
            ..CoreConfig::default()
        };

        assert!(init_logging_from_config(&config).unwrap());
        assert!(init_logging_from_config(&config).unwrap());
        init_logging("INFO", dir.path().to_str().unwrap()).unwrap();

        let louder = CoreConfig {
            log_level: "debug".to_string(),
            ..config.clone()
        };
        assert!(init_logging_from_config(&louder)
            .unwrap_err()
            .contains("refusing to switch"));

        let elsewhere = tempfile::tempdir().unwrap();
        let moved = CoreConfig {
            log_dir: Some(elsewhere.path().to_path_buf()),
            ..config
        };
        assert!(init_logging_from_config(&moved)
            .unwrap_err()
            .contains("refusing to switch"));

        let (level, active_dir) = logging_status().unwrap();
        assert_eq!(level, LevelFilter::Info.as_str());
        assert_eq!(active_dir, dir.path());
    }
}
