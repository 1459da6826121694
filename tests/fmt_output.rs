//! Tests for the text and JSON record forms.

use logwarden::fmt::{Formatter, JsonFormatter, TextFormatter};
use logwarden::{Level, LogEntry};

fn entry(level: Level, message: &str) -> LogEntry {
    LogEntry::builder(level).message(message).build()
}

#[test]
fn plain_text_has_level_and_message() {
    let formatter = TextFormatter::new(false, false, false);
    let line = formatter.format(&entry(Level::Info, "hello")).unwrap();
    assert_eq!(line, "[INFO] - hello");
}

#[test]
fn colors_wrap_only_the_level_tag() {
    let formatter = TextFormatter::new(true, false, false);
    let line = formatter.format(&entry(Level::Error, "boom")).unwrap();
    assert!(line.contains("\x1b[31mERROR\x1b[0m"));
    assert!(line.ends_with("- boom"));
}

#[test]
fn icons_sit_between_tag_and_message() {
    let formatter = TextFormatter::new(false, true, false);
    let line = formatter.format(&entry(Level::Warn, "careful")).unwrap();
    assert_eq!(line, "[WARN] ! - careful");
}

#[test]
fn forced_timestamp_prefixes_the_line() {
    let formatter = TextFormatter::new(false, false, true);
    let line = formatter.format(&entry(Level::Info, "m")).unwrap();
    assert!(line.starts_with('['));
    // [DD-MM-YYYY HH:MM:SS]
    assert_eq!(line.find(']').unwrap(), 20);
}

#[test]
fn metadata_flag_enables_timestamp_per_entry() {
    let formatter = TextFormatter::new(false, false, false);
    let entry = LogEntry::builder(Level::Info)
        .message("m")
        .metadata("showTimestamp", serde_json::json!(true))
        .build();
    let line = formatter.format(&entry).unwrap();
    assert!(line.starts_with('['));
    assert!(line.contains("INFO"));
}

#[test]
fn debug_entries_expand_metadata_as_context() {
    let formatter = TextFormatter::new(false, false, false);
    let entry = LogEntry::builder(Level::Debug)
        .message("m")
        .metadata("request_id", serde_json::json!("abc"))
        .build();
    let line = formatter.format(&entry).unwrap();
    assert!(line.contains("Context:"));
    assert!(line.contains("request_id: \"abc\""));
}

#[test]
fn info_entries_keep_metadata_out_of_the_line() {
    let formatter = TextFormatter::new(false, false, false);
    let entry = LogEntry::builder(Level::Info)
        .message("m")
        .metadata("request_id", serde_json::json!("abc"))
        .build();
    let line = formatter.format(&entry).unwrap();
    assert!(!line.contains("Context:"));
}

#[test]
fn show_context_flag_expands_at_any_level() {
    let formatter = TextFormatter::new(false, false, false);
    let entry = LogEntry::builder(Level::Error)
        .message("m")
        .metadata("showContext", serde_json::json!(true))
        .metadata("zone", serde_json::json!("eu"))
        .build();
    let line = formatter.format(&entry).unwrap();
    assert!(line.contains("Context:"));
    assert!(line.contains("zone"));
    // Control flags are not echoed into the block.
    assert!(!line.contains("showContext:"));
}

#[test]
fn json_formatter_emits_the_serialized_entry() {
    let formatter = JsonFormatter;
    let entry = LogEntry::builder(Level::Fatal)
        .message("dying")
        .source("core")
        .build();
    let line = formatter.format(&entry).unwrap();
    let value: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value["level"], "FATAL");
    assert_eq!(value["severity"], 5);
    assert_eq!(value["message"], "dying");
    assert_eq!(value["source"], "core");
}
