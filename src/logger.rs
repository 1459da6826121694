//! The logging front door: level gate, entry assembly, local write,
//! notifier fan-out, and metric counters.
//!
//! The local write is synchronous: when a log call returns, the record is
//! on disk or stdout. Fan-out and counters run after the write and never
//! fail the call.

use crate::config::{ConfigHandle, Mode};
use crate::entry::LogEntry;
use crate::level::Level;
use crate::metrics::MetricsStore;
use crate::notify::NotifierManager;
use crate::writer::Writer;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Process-wide logger. Cheap to clone via `Arc`; one instance serves the
/// CLI one-shot path and the daemon's request handlers alike.
pub struct Logger {
    config: ConfigHandle,
    notifiers: Arc<NotifierManager>,
    metrics: Arc<MetricsStore>,
    global_metadata: RwLock<HashMap<String, serde_json::Value>>,
}

impl Logger {
    #[must_use]
    pub fn new(
        config: ConfigHandle,
        notifiers: Arc<NotifierManager>,
        metrics: Arc<MetricsStore>,
    ) -> Self {
        Self {
            config,
            notifiers,
            metrics,
            global_metadata: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    #[must_use]
    pub fn notifiers(&self) -> &Arc<NotifierManager> {
        &self.notifiers
    }

    #[must_use]
    pub fn metrics(&self) -> &Arc<MetricsStore> {
        &self.metrics
    }

    /// Sets a metadata value attached to every subsequent entry. Per-call
    /// metadata with the same key wins.
    pub fn set_metadata(&self, key: impl Into<String>, value: serde_json::Value) {
        let mut map = self
            .global_metadata
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        map.insert(key.into(), value);
    }

    /// Removes a global metadata value.
    pub fn remove_metadata(&self, key: &str) {
        let mut map = self
            .global_metadata
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        map.remove(key);
    }

    /// Starts an entry at `level` with the global metadata merged in.
    /// The call site recorded on the entry is the caller of this method.
    #[track_caller]
    #[must_use]
    pub fn entry(&self, level: Level) -> crate::entry::EntryBuilder {
        let builder = LogEntry::builder(level);
        let map = self
            .global_metadata
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        builder.merge_metadata(&map)
    }

    /// Processes one finished entry: gate on the configured minimum level,
    /// validate, write locally, then fan out and count in service mode.
    ///
    /// Entries below the threshold and entries that fail validation are
    /// dropped with a diagnostic; neither is an error to the caller.
    ///
    /// In standalone mode a FATAL entry terminates the process with exit
    /// code 1 once the write completes. In service mode FATAL is delivered
    /// like any other level; an ingested entry must not be able to take the
    /// daemon down.
    pub fn log(&self, entry: &LogEntry) {
        let config = self.config.current();
        if entry.level < config.parse_level() {
            return;
        }
        if let Err(e) = entry.validate() {
            tracing::warn!(error = %e, "dropping invalid log entry");
            return;
        }

        let writer = Writer::from_config(&config);
        if let Err(e) = writer.write(entry) {
            tracing::warn!(error = %e, "failed to write log entry");
        }

        match config.mode {
            Mode::Service => {
                for (name, e) in self.notifiers.dispatch(entry) {
                    tracing::warn!(notifier = %name, error = %e, "notifier delivery failed");
                }
                self.count(entry.level);
            }
            Mode::Standalone => {
                // The daemon rotates from its housekeeping task; one-shot
                // invocations have to check inline.
                if writer.file_path().is_some() {
                    if let Err(e) = crate::rotate::check_log_size(&config) {
                        tracing::warn!(error = %e, "log rotation check failed");
                    }
                }
                if entry.level == Level::Fatal {
                    std::process::exit(1);
                }
            }
        }
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        let entry = self.entry(Level::Debug).message(message).build();
        self.log(&entry);
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        let entry = self.entry(Level::Info).message(message).build();
        self.log(&entry);
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        let entry = self.entry(Level::Warn).message(message).build();
        self.log(&entry);
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        let entry = self.entry(Level::Error).message(message).build();
        self.log(&entry);
    }

    /// Logs at FATAL and terminates the process with exit code 1 after the
    /// write and fan-out complete.
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) -> ! {
        let entry = self.entry(Level::Fatal).message(message).build();
        self.log(&entry);
        std::process::exit(1);
    }

    // Counter updates are best-effort; the generated names always satisfy
    // the metric naming rules.
    fn count(&self, level: Level) {
        if let Err(e) = self.metrics.increment_metric("logs_total", 1.0) {
            tracing::warn!(error = %e, "failed to count log entry");
        }
        let per_level = format!("logs_total_{}", level.as_str());
        if let Err(e) = self.metrics.increment_metric(&per_level, 1.0) {
            tracing::warn!(error = %e, "failed to count log entry");
        }
    }
}
