//! Session configuration.
//!
//! Values here are fixed for the lifetime of a session. The binary fills them
//! from command-line flags; library users start from `Config::default()`.

use crate::logger::LogLevel;

pub const DEFAULT_MAX_DEPTH: usize = 256;
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Deepest expression nesting the parser accepts before failing the item.
    pub max_depth: usize,
    /// Deepest call nesting the interpreter evaluates before failing.
    pub max_call_depth: usize,
    /// Log every parsed unit as an s-expression.
    pub dump_ast: bool,
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: DEFAULT_MAX_DEPTH,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            dump_ast: false,
            log_level: LogLevel::Warn,
        }
    }
}

impl Config {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    pub fn with_dump_ast(mut self, dump_ast: bool) -> Self {
        self.dump_ast = dump_ast;
        self
    }

    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    /// Level to run the logger at. AST dumps are logged at `Info`, so
    /// dumping raises a quieter level to `Info`.
    pub fn effective_log_level(&self) -> LogLevel {
        match self.log_level {
            LogLevel::Warn | LogLevel::Error if self.dump_ast => LogLevel::Info,
            level => level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use crate::logger::LogLevel;

    #[test]
    fn test_effective_log_level() {
        assert_eq!(Config::default().effective_log_level(), LogLevel::Warn);

        let dumping = Config::default().with_dump_ast(true);
        assert_eq!(dumping.effective_log_level(), LogLevel::Info);
        assert_eq!(
            dumping.with_log_level(LogLevel::Debug).effective_log_level(),
            LogLevel::Debug
        );
        assert_eq!(
            Config::default().with_log_level(LogLevel::Error).effective_log_level(),
            LogLevel::Error
        );
    }
}
