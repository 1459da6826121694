//! The one-shot logging path: emit a single structured entry and exit.

use super::parse_pair;
use crate::cli::LogArgs;
use crate::level::Level;
use crate::logger::Logger;

/// Emits one entry at `level` from the CLI arguments. FATAL terminates the
/// process with exit code 1 after the entry is written.
///
/// # Errors
/// An empty message and malformed `key=value` arguments.
pub fn cmd_log(level: Level, args: &LogArgs, logger: &Logger) -> Result<(), crate::Error> {
    let message = args.message.join(" ");
    if message.is_empty() {
        return Err(crate::Error::InvalidEntry("message is required".into()));
    }

    let mut builder = logger.entry(level).message(message);
    if let Some(source) = &args.source {
        builder = builder.source(source.clone());
    }
    if let Some(context) = &args.context {
        builder = builder.context(context.clone());
    }
    for raw in &args.tag {
        let (key, value) = parse_pair(raw)?;
        builder = builder.tag(key, value);
    }
    for raw in &args.metadata {
        let (key, value) = parse_pair(raw)?;
        // JSON values pass through typed; anything else stays a string.
        let parsed = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        builder = builder.metadata(key, parsed);
    }

    logger.log(&builder.build());
    if level == Level::Fatal {
        std::process::exit(1);
    }
    Ok(())
}
