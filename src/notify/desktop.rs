//! Desktop notification delivery via the system notification service.

use super::{FiringRules, Notifier};
use crate::config::NotifierConfig;
use crate::entry::LogEntry;
use std::process::Command;

/// Renders the entry as plain text and hands it to `notify-send`, which
/// speaks the desktop bus so this process doesn't have to.
pub struct DesktopNotifier {
    rules: FiringRules,
}

impl DesktopNotifier {
    #[must_use]
    pub fn from_config(config: &NotifierConfig) -> Self {
        Self {
            rules: FiringRules::from_config(config),
        }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, entry: &LogEntry) -> Result<(), crate::Error> {
        if !self.rules.allows(entry) {
            return Ok(());
        }

        let summary = if entry.source.is_empty() {
            format!("[{}] logwarden", entry.level)
        } else {
            format!("[{}] {}", entry.level, entry.source)
        };

        let status = Command::new("notify-send")
            .arg(&summary)
            .arg(&entry.message)
            .status()
            .map_err(|e| crate::Error::Notify(format!("notify-send: {e}")))?;

        if !status.success() {
            return Err(crate::Error::Notify(format!(
                "notify-send exited with {status}"
            )));
        }
        Ok(())
    }
}
