//! The log-entry value object: built once per log call, immutable afterwards,
//! consumed by the writer, the notifiers, and the metrics counters within that
//! same call.

use crate::level::Level;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::panic::Location;

/// One structured log event with level, message, metadata, and provenance.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// UTC instant the entry was created.
    pub timestamp: DateTime<Utc>,
    /// Severity level of the entry.
    pub level: Level,
    /// Component or application that produced the entry.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source: String,
    /// Free-form context string.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub context: String,
    /// The log message.
    pub message: String,
    /// Optional string tags.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
    /// Optional structured metadata.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Process id of the emitting process.
    pub pid: u32,
    /// Hostname where the entry was created.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub hostname: String,
    /// Integer severity mirroring `level` (1–5).
    pub severity: u8,
    /// Trace id correlating related entries.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub trace_id: String,
    /// `file:line` of the call site that produced the entry.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub caller: String,
}

impl LogEntry {
    /// Captures the call site, so the builder must be constructed directly at
    /// the logging boundary, not inside a helper.
    #[track_caller]
    #[must_use]
    pub fn builder(level: Level) -> EntryBuilder {
        EntryBuilder::new(level)
    }

    /// An entry is usable only with a timestamp, a level, a non-empty message,
    /// and a positive severity.
    ///
    /// # Errors
    /// Returns `Error::InvalidEntry` naming the first missing field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.timestamp.timestamp() == 0 && self.timestamp.timestamp_subsec_nanos() == 0 {
            return Err(crate::Error::InvalidEntry("timestamp is required".into()));
        }
        if self.message.is_empty() {
            return Err(crate::Error::InvalidEntry("message is required".into()));
        }
        if self.severity == 0 {
            return Err(crate::Error::InvalidEntry(
                "severity must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} - {}",
            self.timestamp.to_rfc3339(),
            self.level,
            self.message
        )
    }
}

/// Stepwise construction of a [`LogEntry`].
#[derive(Debug)]
pub struct EntryBuilder {
    entry: LogEntry,
}

impl EntryBuilder {
    #[track_caller]
    fn new(level: Level) -> Self {
        Self {
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                source: String::new(),
                context: String::new(),
                message: String::new(),
                tags: HashMap::new(),
                metadata: HashMap::new(),
                pid: std::process::id(),
                hostname: hostname(),
                severity: level.severity(),
                trace_id: ulid::Ulid::new().to_string(),
                caller: caller_info(Location::caller()),
            },
        }
    }

    /// Sets the log message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.entry.message = message.into();
        self
    }

    /// Sets the source component name.
    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.entry.source = source.into();
        self
    }

    /// Sets the free-form context string.
    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.entry.context = context.into();
        self
    }

    /// Overrides the generated trace id, for callers propagating an upstream id.
    #[must_use]
    pub fn trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.entry.trace_id = trace_id.into();
        self
    }

    /// Adds one string tag.
    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entry.tags.insert(key.into(), value.into());
        self
    }

    /// Adds one metadata value.
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.entry.metadata.insert(key.into(), value);
        self
    }

    /// Merges a metadata map; existing keys are overwritten, so merge the
    /// global map first and the per-call map second.
    #[must_use]
    pub fn merge_metadata(mut self, map: &HashMap<String, serde_json::Value>) -> Self {
        for (k, v) in map {
            self.entry.metadata.insert(k.clone(), v.clone());
        }
        self
    }

    /// Finishes construction. Validation stays a separate step so callers can
    /// decide whether a bad entry is a warning (logger) or an error (API).
    #[must_use]
    pub fn build(self) -> LogEntry {
        self.entry
    }
}

/// `file:line`, trimmed to the last two path components.
fn caller_info(location: &Location<'_>) -> String {
    let file = location.file();
    let parts: Vec<&str> = file.split('/').collect();
    let trimmed = if parts.len() > 2 {
        parts[parts.len() - 2..].join("/")
    } else {
        file.to_string()
    };
    format!("{trimmed}:{}", location.line())
}

#[cfg(unix)]
fn hostname() -> String {
    nix::unistd::gethostname()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_default()
}

#[cfg(not(unix))]
fn hostname() -> String {
    std::env::var("COMPUTERNAME").unwrap_or_default()
}
