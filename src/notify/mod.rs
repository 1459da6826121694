//! Pluggable sinks that forward log entries to external systems.
//!
//! Delivery is best-effort: per-sink failures are collected and reported,
//! never propagated to the logging caller, and one failing sink never
//! blocks delivery to the others.

mod bus;
mod desktop;
mod http;
mod manager;

pub use bus::BusNotifier;
pub use desktop::DesktopNotifier;
pub use http::HttpNotifier;
pub use manager::NotifierManager;

use crate::config::NotifierConfig;
use crate::entry::LogEntry;
use crate::level::Level;

/// A sink that forwards one entry to an external system.
pub trait Notifier: Send + Sync {
    /// Delivers the entry. Entries filtered out by the shared firing rules
    /// return `Ok` without any I/O.
    ///
    /// # Errors
    /// Transport failures (HTTP status, socket, command). Never panics.
    fn notify(&self, entry: &LogEntry) -> Result<(), crate::Error>;
}

/// The three gate checks every transport honors before doing any I/O:
/// enabled flag, minimum-level filter, and source whitelist.
#[derive(Debug, Clone, Default)]
pub struct FiringRules {
    enabled: bool,
    min_level: Option<Level>,
    whitelist: Vec<String>,
}

impl FiringRules {
    #[must_use]
    pub fn from_config(config: &NotifierConfig) -> Self {
        let min_level = if config.log_level.is_empty() {
            None
        } else {
            match config.log_level.parse::<Level>() {
                Ok(level) => Some(level),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring notifier level filter");
                    None
                }
            }
        };
        Self {
            enabled: config.enabled,
            min_level,
            whitelist: config.whitelist.clone(),
        }
    }

    /// Explicit construction for tests and embedding code.
    #[must_use]
    pub fn new(enabled: bool, min_level: Option<Level>, whitelist: Vec<String>) -> Self {
        Self {
            enabled,
            min_level,
            whitelist,
        }
    }

    /// A notifier fires only if enabled, the entry reaches the level filter
    /// (when set), and the source is whitelisted (when the list is non-empty).
    #[must_use]
    pub fn allows(&self, entry: &LogEntry) -> bool {
        if !self.enabled {
            return false;
        }
        if let Some(min) = self.min_level {
            if entry.level < min {
                return false;
            }
        }
        if !self.whitelist.is_empty() && !self.whitelist.iter().any(|s| *s == entry.source) {
            return false;
        }
        true
    }
}
