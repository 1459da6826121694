//! Machine-readable record form: one JSON object per line.

use super::Formatter;
use crate::entry::LogEntry;

/// Serializes the whole entry; empty optional fields are omitted by the
/// entry's serde attributes so records stay compact.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, entry: &LogEntry) -> Result<String, crate::Error> {
        Ok(serde_json::to_string(entry)?)
    }
}
