//! Rendering a [`LogEntry`](crate::entry::LogEntry) to text or a structured
//! record. Two built-in formatters cover the config surface (`text`, `json`);
//! the trait keeps the writer independent of the concrete rendering.

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::entry::LogEntry;

/// Converts one entry to its on-disk / on-terminal representation,
/// without the trailing newline; the writer owns record termination.
pub trait Formatter: Send + Sync {
    /// # Errors
    /// Serialization failures (JSON marshalling).
    fn format(&self, entry: &LogEntry) -> Result<String, crate::Error>;
}

/// Selects a formatter from the config `format` field; anything other
/// than `json` renders as text, matching the config default.
#[must_use]
pub fn from_name(name: &str) -> Box<dyn Formatter> {
    if name.eq_ignore_ascii_case("json") {
        Box::new(JsonFormatter)
    } else {
        Box::new(TextFormatter::from_env())
    }
}
