//! Logging bridge for the runetype binary.
//!
//! Routes every `log::info!()`/`warn!()`/`debug!()` call from the workspace
//! crates to stderr. The level is chosen by the `--log-level` flag, then by the
//! `DEBUG_LEVEL` environment variable:
//! - 0 or unset: Off
//! - 1: Errors and warnings
//! - 2: Info (configuration, atlas creation)
//! - 3: Debug (resets, fallback decisions)
//! - 4: Trace

use std::io::Write;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Debug level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum DebugLevel {
    #[default]
    Off = 0,
    Error = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl DebugLevel {
    /// Level from `DEBUG_LEVEL`; `Off` when unset or unparseable.
    pub fn from_env() -> Self {
        std::env::var("DEBUG_LEVEL")
            .ok()
            .and_then(|val| val.parse().ok())
            .unwrap_or(DebugLevel::Off)
    }

    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            DebugLevel::Off => log::LevelFilter::Off,
            DebugLevel::Error => log::LevelFilter::Warn,
            DebugLevel::Info => log::LevelFilter::Info,
            DebugLevel::Debug => log::LevelFilter::Debug,
            DebugLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl FromStr for DebugLevel {
    type Err = String;

    /// Accepts the numeric levels and their names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "off" => Ok(DebugLevel::Off),
            "1" | "error" | "warn" => Ok(DebugLevel::Error),
            "2" | "info" => Ok(DebugLevel::Info),
            "3" | "debug" => Ok(DebugLevel::Debug),
            "4" | "trace" => Ok(DebugLevel::Trace),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// The `log::Log` implementation installed by [`init_log_bridge`].
struct StderrLogger {
    filter: log::LevelFilter,
    out: Mutex<std::io::Stderr>,
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        let mut out = self.out.lock();
        let _ = out.write_all(line.as_bytes());
    }

    fn flush(&self) {
        let _ = self.out.lock().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

fn timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Install the stderr logger. `level` overrides `DEBUG_LEVEL` when given.
///
/// Only the first call installs anything; later calls are ignored.
pub fn init_log_bridge(level: Option<DebugLevel>) {
    let level = level.unwrap_or_else(DebugLevel::from_env);
    let filter = level.to_filter();
    let logger = LOGGER.get_or_init(|| StderrLogger {
        filter,
        out: Mutex::new(std::io::stderr()),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.filter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!("0".parse::<DebugLevel>(), Ok(DebugLevel::Off));
        assert_eq!("debug".parse::<DebugLevel>(), Ok(DebugLevel::Debug));
        assert_eq!(" 4 ".parse::<DebugLevel>(), Ok(DebugLevel::Trace));
        assert!("loud".parse::<DebugLevel>().is_err());
    }

    #[test]
    fn test_error_level_includes_warnings() {
        assert_eq!(DebugLevel::Error.to_filter(), log::LevelFilter::Warn);
        assert!(DebugLevel::Info > DebugLevel::Error);
    }
}
