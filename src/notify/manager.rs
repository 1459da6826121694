//! Name-keyed registry owning the active set of notifiers.

use super::{BusNotifier, DesktopNotifier, HttpNotifier, Notifier};
use crate::config::Config;
use crate::entry::LogEntry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Registry of named notifiers. Reconfiguration replaces the whole map in
/// one swap, so a reload can never leave a half-updated registry visible
/// to a concurrent log call.
#[derive(Default)]
pub struct NotifierManager {
    notifiers: RwLock<HashMap<String, Arc<dyn Notifier>>>,
}

impl NotifierManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the notifier registered under `name`.
    pub fn add_notifier(&self, name: &str, notifier: Arc<dyn Notifier>) {
        let mut map = self
            .notifiers
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        map.insert(name.to_string(), notifier);
        tracing::debug!(name, "notifier added");
    }

    /// Removes the notifier registered under `name`, if any.
    pub fn remove_notifier(&self, name: &str) {
        let mut map = self
            .notifiers
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        map.remove(name);
        tracing::debug!(name, "notifier removed");
    }

    #[must_use]
    pub fn get_notifier(&self, name: &str) -> Option<Arc<dyn Notifier>> {
        let map = self
            .notifiers
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        map.get(name).cloned()
    }

    /// Registered names, sorted for stable listing.
    #[must_use]
    pub fn list_notifiers(&self) -> Vec<String> {
        let map = self
            .notifiers
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut names: Vec<String> = map.keys().cloned().collect();
        names.sort();
        names
    }

    /// Rebuilds the registry from a config snapshot. Entries with an
    /// unknown `type` are skipped with a warning; a notifier absent from
    /// the snapshot is gone after this call.
    pub fn update_from_config(&self, config: &Config) {
        let mut next: HashMap<String, Arc<dyn Notifier>> = HashMap::new();
        for (name, nc) in &config.notifiers {
            let notifier: Arc<dyn Notifier> = match nc.kind.as_str() {
                "http" => Arc::new(HttpNotifier::from_config(nc)),
                "bus" | "message-queue" => Arc::new(BusNotifier::from_config(nc)),
                "desktop-bus" => Arc::new(DesktopNotifier::from_config(nc)),
                other => {
                    tracing::warn!(name = %name, kind = other, "unknown notifier type, skipping");
                    continue;
                }
            };
            next.insert(name.clone(), notifier);
        }
        let count = next.len();
        let mut map = self
            .notifiers
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *map = next;
        tracing::debug!(count, "notifier registry rebuilt from config");
    }

    /// Best-effort broadcast: every registered notifier gets its turn, and
    /// per-sink failures come back as a list for the caller to report.
    #[must_use]
    pub fn dispatch(&self, entry: &LogEntry) -> Vec<(String, crate::Error)> {
        let snapshot: Vec<(String, Arc<dyn Notifier>)> = {
            let map = self
                .notifiers
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            map.iter().map(|(n, s)| (n.clone(), s.clone())).collect()
        };

        let mut failures = Vec::new();
        for (name, notifier) in snapshot {
            if let Err(e) = notifier.notify(entry) {
                failures.push((name, e));
            }
        }
        failures
    }
}
