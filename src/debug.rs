//! Log bridge for the `namecolor` binary.
//!
//! Routes every `log::info!()` etc. from the plugin and the store to stderr,
//! and optionally mirrors it to a log file. Level precedence: explicit
//! `--log-level`, then `RUST_LOG`, then `info`.
use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

struct LogBridge {
    level: LevelFilter,
    file: Mutex<Option<File>>,
}

impl LogBridge {
    fn write_line(&self, line: &str) {
        eprintln!("{line}");
        if let Some(ref mut file) = *self.file.lock() {
            let _ = writeln!(file, "{line}");
            let _ = file.flush();
        }
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.write_line(&format!(
            "[{}] [{:<5}] [{}] {}",
            get_timestamp(),
            record.level(),
            record.target(),
            record.args()
        ));
    }

    fn flush(&self) {
        if let Some(ref mut file) = *self.file.lock() {
            let _ = file.flush();
        }
    }
}

static BRIDGE: OnceLock<LogBridge> = OnceLock::new();

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Parse a `RUST_LOG`-style value. Only a bare level is understood; module
/// directives (`foo=debug`) fall back to the default.
pub fn level_from_env_value(value: &str) -> Option<LevelFilter> {
    value.trim().parse().ok()
}

/// Resolve the effective level from the CLI override and `RUST_LOG`.
pub fn resolve_level(cli_level: Option<LevelFilter>) -> LevelFilter {
    cli_level
        .or_else(|| {
            std::env::var("RUST_LOG")
                .ok()
                .and_then(|v| level_from_env_value(&v))
        })
        .unwrap_or(LevelFilter::Info)
}

/// Install the bridge as the global logger. Safe to call more than once;
/// only the first call takes effect.
///
/// A log file that cannot be opened is reported on stderr and skipped.
pub fn init_log_bridge(cli_level: Option<LevelFilter>, log_file: Option<&Path>) {
    let level = resolve_level(cli_level);

    let file = log_file.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => Some(f),
            Err(e) => {
                eprintln!("namecolor: cannot open log file {}: {e}", path.display());
                None
            }
        }
    });

    let bridge = BRIDGE.get_or_init(|| LogBridge {
        level,
        file: Mutex::new(file),
    });
    if log::set_logger(bridge).is_ok() {
        log::set_max_level(bridge.level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_env_value() {
        assert_eq!(level_from_env_value("debug"), Some(LevelFilter::Debug));
        assert_eq!(level_from_env_value(" WARN "), Some(LevelFilter::Warn));
        assert_eq!(level_from_env_value("namecolor=trace"), None);
    }

    #[test]
    fn test_cli_level_wins() {
        assert_eq!(resolve_level(Some(LevelFilter::Trace)), LevelFilter::Trace);
    }
}
