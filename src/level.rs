//! Severity levels that gate which entries reach the writer and the sinks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Derives `Ord` so the logger can compare an entry's level against the
/// configured minimum. Severity values 1–5 mirror the wire `severity` field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    /// Development-time diagnostics, too noisy for normal operation.
    Debug = 1,
    /// Normal operational milestones: service started, config loaded, etc.
    #[default]
    Info = 2,
    /// Non-fatal anomalies that may need attention.
    Warn = 3,
    /// Failures that prevent an operation from completing.
    Error = 4,
    /// Unrecoverable failures; logging at this level terminates the process.
    Fatal = 5,
}

impl Level {
    /// Uppercase because the wire format and metric suffixes use uppercase labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }

    /// Integer severity, 1 (DEBUG) through 5 (FATAL).
    #[must_use]
    pub const fn severity(self) -> u8 {
        self as u8
    }

    /// Convenience for iteration, used by CLI help and tests.
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::Debug,
            Self::Info,
            Self::Warn,
            Self::Error,
            Self::Fatal,
        ]
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "ERROR" | "ERR" => Ok(Self::Error),
            "FATAL" => Ok(Self::Fatal),
            _ => Err(crate::Error::InvalidLevel(s.to_string())),
        }
    }
}
