//! Executor configuration.
//!
//! The teacher's `redis/config.rs` reads a file of whitespace-separated
//! directive lines at startup. There is no startup file here, but the same
//! directive-parsing shape is kept for `ExecutorConfig::parse_line` since a
//! host embedding this executor may still want to thread a handful of lines
//! of config through without pulling in a config crate for three fields.

use crate::util::LogLevel;

#[derive(Clone, Copy)]
pub struct ExecutorConfig {
    pub verbosity: LogLevel,
    /// Fixed seed for the random-pick source. `None` seeds from entropy.
    pub random_seed: Option<u64>,
    /// How long a blocking command sleeps between retries while waiting on
    /// the condition variable, bounded by the command's own deadline.
    pub blocking_poll: std::time::Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig {
            verbosity: LogLevel::Notice,
            random_seed: None,
            blocking_poll: std::time::Duration::from_millis(50),
        }
    }
}

impl ExecutorConfig {
    /// Applies a single `directive value` line, case-insensitive on the
    /// directive name. Unknown directives and malformed values are ignored
    /// rather than aborting the process — there is no `exit(1)` available
    /// (or appropriate) inside a library.
    pub fn apply_line(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return;
        }
        let argv: Vec<&str> = trimmed.split_whitespace().collect();
        if argv.len() != 2 {
            return;
        }
        match argv[0].to_ascii_lowercase().as_str() {
            "verbosity" => {
                self.verbosity = match argv[1].to_ascii_lowercase().as_str() {
                    "debug" => LogLevel::Debug,
                    "verbose" => LogLevel::Verbose,
                    "notice" => LogLevel::Notice,
                    "warning" => LogLevel::Warning,
                    _ => self.verbosity,
                };
            }
            "random-seed" => {
                if let Ok(seed) = argv[1].parse() {
                    self.random_seed = Some(seed);
                }
            }
            "blocking-poll-ms" => {
                if let Ok(ms) = argv[1].parse() {
                    self.blocking_poll = std::time::Duration::from_millis(ms);
                }
            }
            _ => {}
        }
    }

    pub fn parse(text: &str) -> Self {
        let mut config = Self::default();
        for line in text.lines() {
            config.apply_line(line);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_directives() {
        let config = ExecutorConfig::parse("verbosity debug\nrandom-seed 7\nblocking-poll-ms 10\n");
        assert_eq!(config.verbosity, LogLevel::Debug);
        assert_eq!(config.random_seed, Some(7));
        assert_eq!(config.blocking_poll, std::time::Duration::from_millis(10));
    }

    #[test]
    fn ignores_unknown_and_malformed_lines() {
        let config = ExecutorConfig::parse("# comment\nbogus-directive yes\nverbosity\n");
        assert_eq!(config.verbosity, LogLevel::Notice);
    }
}
