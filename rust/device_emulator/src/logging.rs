use log::{LevelFilter, Metadata, Record};
use std::sync::Once;

pub struct EmulatorLogger {
    level: LevelFilter,
}

impl log::Log for EmulatorLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!(
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static INIT: Once = Once::new();

/// Installs the console logger. Only the first call takes effect.
pub fn init_logger(level: LevelFilter) {
    INIT.call_once(|| {
        let logger = EmulatorLogger { level };
        if log::set_boxed_logger(Box::new(logger)).is_ok() {
            log::set_max_level(level);
        }
    });
}

/// Maps `error`, `warn`, `info`, `debug` and `trace` to a filter.
/// Anything else falls back to `error`.
pub fn parse_level(name: &str) -> LevelFilter {
    match name.trim().to_ascii_lowercase().as_str() {
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Error,
    }
}
