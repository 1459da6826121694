//! Unified error type for all logwarden operations.

use std::path::PathBuf;

/// Error type for logwarden operations.
#[derive(Debug)]
pub enum Error {
    /// I/O error.
    Io(std::io::Error),
    /// JSON config or payload parsing error.
    Json(serde_json::Error),
    /// YAML config parsing error.
    Yaml(serde_yaml::Error),
    /// TOML config parsing error.
    Toml(toml::de::Error),
    /// Config file extension maps to no supported format.
    UnsupportedConfigFormat(String),
    /// Config directory could not be resolved.
    ConfigDirNotFound,
    /// Invalid log level string.
    InvalidLevel(String),
    /// Log entry failed validation.
    InvalidEntry(String),
    /// Metric name rejected by the naming rules.
    InvalidMetricName(String),
    /// Notifier transport failure (HTTP status, socket error, command failure).
    Notify(String),
    /// Archive creation failure.
    Archive(String),
    /// A pid file already exists for a running instance.
    AlreadyRunning(PathBuf),
    /// The pid file exists but another process holds its lock.
    PidFileLocked,
    /// No pid file, or its contents are not `"<pid>\n<port>"`.
    NotRunning(PathBuf),
    /// Sending a termination signal to the recorded pid failed.
    Signal(String),
    /// In-flight requests did not drain within the grace period.
    ShutdownTimeout,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Yaml(e) => write!(f, "YAML parse error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::UnsupportedConfigFormat(ext) => {
                write!(
                    f,
                    "unsupported config format: .{ext} (use json, yaml, or toml)"
                )
            }
            Self::ConfigDirNotFound => write!(f, "config directory not found"),
            Self::InvalidLevel(s) => write!(f, "invalid log level: '{s}'"),
            Self::InvalidEntry(s) => write!(f, "invalid log entry: {s}"),
            Self::InvalidMetricName(s) => write!(
                f,
                "invalid metric name '{s}': must match [a-zA-Z_:][a-zA-Z0-9_:]*"
            ),
            Self::Notify(s) => write!(f, "notifier error: {s}"),
            Self::Archive(s) => write!(f, "archive error: {s}"),
            Self::AlreadyRunning(p) => {
                write!(
                    f,
                    "service already running (pid file exists: {})",
                    p.display()
                )
            }
            Self::PidFileLocked => write!(f, "another process is writing to the PID file"),
            Self::NotRunning(p) => {
                write!(f, "service not running (no pid file at {})", p.display())
            }
            Self::Signal(s) => write!(f, "failed to signal process: {s}"),
            Self::ShutdownTimeout => {
                write!(f, "shutdown did not complete within the grace period")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Yaml(e) => Some(e),
            Self::Toml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}
