//! Small ambient helpers: leveled logging and wall-clock access.
//!
//! Mirrors the teacher's `util::timestamp`/`redis/log.rs` split rather than
//! pulling in a logging crate — this executor has no server process and no
//! log file, so logging always goes to stderr.

use std::fmt::Display;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum LogLevel {
    Debug,
    Verbose,
    Notice,
    Warning,
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ch = match self {
            Self::Debug => '.',
            Self::Verbose => '-',
            Self::Notice => '*',
            Self::Warning => '#',
        };
        write!(f, "{ch}")
    }
}

pub fn timestamp() -> Duration {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap()
}

/// Writes `body` to stderr if `level >= threshold`.
pub fn log(threshold: LogLevel, level: LogLevel, body: &str) {
    if level < threshold {
        return;
    }
    eprintln!("[{}] {} {}: {}", std::process::id(), timestamp().as_millis(), level, body);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Notice);
        assert_eq!(format!("{}", LogLevel::Warning), "#");
    }

    #[test]
    fn log_respects_threshold() {
        log(LogLevel::Notice, LogLevel::Debug, "should be suppressed");
        log(LogLevel::Notice, LogLevel::Warning, "should print");
    }
}
