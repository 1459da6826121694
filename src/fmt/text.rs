//! Human-readable record form with level-colored prefix and icon.

use super::Formatter;
use crate::entry::LogEntry;
use crate::level::Level;

const RESET: &str = "\x1b[0m";

/// All terminal-affecting toggles resolved once at construction so the
/// per-record path does no environment lookups.
#[derive(Debug, Clone)]
pub struct TextFormatter {
    colors_enabled: bool,
    icons_enabled: bool,
    force_timestamp: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::from_env()
    }
}

impl TextFormatter {
    /// Piped output, CI environments, and Windows consoles can't be assumed
    /// to render ANSI escape codes.
    #[must_use]
    pub fn from_env() -> Self {
        let no_color = std::env::var_os("LOGWARDEN_NO_COLOR").is_some()
            || std::env::var_os("NO_COLOR").is_some()
            || cfg!(windows);
        let no_icon = std::env::var_os("LOGWARDEN_NO_ICON").is_some();
        let force_timestamp = std::env::var("LOGWARDEN_TIMESTAMP").as_deref() == Ok("true");
        Self {
            colors_enabled: !no_color,
            icons_enabled: !no_icon,
            force_timestamp,
        }
    }

    /// Explicit toggles for tests and embedding code.
    #[must_use]
    pub const fn new(colors: bool, icons: bool, timestamp: bool) -> Self {
        Self {
            colors_enabled: colors,
            icons_enabled: icons,
            force_timestamp: timestamp,
        }
    }

    fn level_tag(&self, level: Level) -> String {
        if self.colors_enabled {
            format!("{}{}{RESET}", color_code(level), level.as_str())
        } else {
            level.as_str().to_string()
        }
    }

    fn icon(&self, level: Level) -> &'static str {
        if !self.icons_enabled {
            return "";
        }
        match level {
            Level::Debug => "* ",
            Level::Info => "i ",
            Level::Warn => "! ",
            Level::Error => "x ",
            Level::Fatal => "!! ",
        }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, entry: &LogEntry) -> Result<String, crate::Error> {
        // Per-entry metadata can opt in to timestamp and context expansion.
        let flag = |key: &str| {
            entry
                .metadata
                .get(key)
                .is_some_and(|v| v.as_str() == Some("true") || v.as_bool() == Some(true))
        };

        let timestamp = if self.force_timestamp || flag("showTimestamp") {
            format!("[{}] ", entry.timestamp.format("%d-%m-%Y %H:%M:%S"))
        } else {
            String::new()
        };

        let mut line = format!(
            "{timestamp}[{}] {}- {}",
            self.level_tag(entry.level),
            self.icon(entry.level),
            entry.message
        );

        // The expanded block is noisy; only DEBUG entries and explicit
        // showContext requests get it.
        if !entry.metadata.is_empty() && (entry.level == Level::Debug || flag("showContext")) {
            line.push_str("\nContext:");
            let mut keys: Vec<&String> = entry.metadata.keys().collect();
            keys.sort();
            for key in keys {
                if key == "showContext" || key == "showTimestamp" {
                    continue;
                }
                line.push_str(&format!("\n  - {key}: {}", entry.metadata[key]));
            }
        }

        Ok(line)
    }
}

const fn color_code(level: Level) -> &'static str {
    match level {
        Level::Debug => "\x1b[34m",
        Level::Info => "\x1b[32m",
        Level::Warn => "\x1b[33m",
        Level::Error => "\x1b[31m",
        Level::Fatal => "\x1b[35m",
    }
}
