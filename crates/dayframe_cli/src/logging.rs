use std::io::{self, Write};

use clap::ValueEnum;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Raises the level by one step per `-v`.
    pub fn to_filter(self, verbosity: u8) -> LevelFilter {
        const LEVELS: [LevelFilter; 6] = [
            LevelFilter::Off,
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
            LevelFilter::Trace,
        ];

        let index = (self as usize + usize::from(verbosity)).min(LEVELS.len() - 1);
        LEVELS[index]
    }
}

/// Writes `[LEVEL] target: message` lines to stderr.
struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "[{}] {}: {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

pub fn initialize(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(StderrLogger { level }))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_raises_level() {
        assert_eq!(LogLevel::Warn.to_filter(0), LevelFilter::Warn);
        assert_eq!(LogLevel::Warn.to_filter(1), LevelFilter::Info);
        assert_eq!(LogLevel::Warn.to_filter(9), LevelFilter::Trace);
        assert_eq!(LogLevel::Off.to_filter(0), LevelFilter::Off);
    }
}
