//! # Diagnostic Logging
//!
//! Verbosity is an explicit [`LogSettings`] value built from the arguments.
//! The subscriber is installed for the duration of one [`LogSettings::scope`]
//! call and dropped afterwards. No global subscriber is registered and
//! `RUST_LOG` is never consulted.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

use crate::args::LogLevel;

impl LogLevel {
    /// `EnvFilter` directive for this level. `CRITICAL` collapses to
    /// `error`, the most severe level `tracing` has.
    pub fn directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error | Self::Critical => "error",
        }
    }
}

/// Diagnostic stream configuration for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    level: LogLevel,
}

impl LogSettings {
    /// Settings that emit records at `level` and above.
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// Selected verbosity.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Run `f` with a stderr subscriber at this verbosity.
    pub fn scope<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(self.level.directive()))
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(false)
            .finish();

        tracing::subscriber::with_default(subscriber, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_follow_severity() {
        assert_eq!(LogLevel::Debug.directive(), "debug");
        assert_eq!(LogLevel::Info.directive(), "info");
        assert_eq!(LogLevel::Warning.directive(), "warn");
        assert_eq!(LogLevel::Error.directive(), "error");
        assert_eq!(LogLevel::Critical.directive(), "error");
    }

    #[test]
    fn scope_returns_closure_value() {
        let settings = LogSettings::new(LogLevel::Error);
        assert_eq!(settings.level(), LogLevel::Error);
        let value = settings.scope(|| {
            tracing::info!("suppressed at ERROR");
            7
        });
        assert_eq!(value, 7);
    }

    #[test]
    fn scope_does_not_leak_subscriber() {
        LogSettings::new(LogLevel::Debug).scope(|| {
            assert!(tracing::enabled!(tracing::Level::DEBUG));
        });
        LogSettings::new(LogLevel::Warning).scope(|| {
            assert!(!tracing::enabled!(tracing::Level::INFO));
            assert!(tracing::enabled!(tracing::Level::WARN));
        });
    }
}
