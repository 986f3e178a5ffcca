//! Severity levels and the two output bands.

use std::fmt;

use crate::config::Profile;

/// Severity of a record, numbered like the conventional five-level scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug = 10,
    Info = 20,
    Warning = 30,
    Error = 40,
    Critical = 50,
}

/// Which output stream a level is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelBand {
    /// DEBUG..=WARNING, written to standard output.
    Low,
    /// ERROR..=CRITICAL, written to standard error.
    High,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warning,
        Level::Error,
        Level::Critical,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn band(&self) -> LevelBand {
        if *self >= Level::Error {
            LevelBand::High
        } else {
            LevelBand::Low
        }
    }

    /// Verbosity threshold for a profile.
    pub fn threshold_for(profile: Profile) -> Level {
        if profile.is_verbose() {
            Level::Debug
        } else {
            Level::Info
        }
    }

    /// CRITICAL has no `tracing` counterpart and travels as ERROR; the
    /// record keeps its own name and number.
    pub(crate) fn as_tracing(&self) -> tracing::Level {
        match self {
            Level::Debug => tracing::Level::DEBUG,
            Level::Info => tracing::Level::INFO,
            Level::Warning => tracing::Level::WARN,
            Level::Error | Level::Critical => tracing::Level::ERROR,
        }
    }

    pub(crate) fn from_tracing(level: &tracing::Level) -> Level {
        if *level >= tracing::Level::DEBUG {
            Level::Debug
        } else if *level == tracing::Level::INFO {
            Level::Info
        } else if *level == tracing::Level::WARN {
            Level::Warning
        } else {
            Level::Error
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
