//! Persisting a formatted entry to its sink. The file sink opens per write
//! (append mode) so rotation can truncate or replace the file between calls
//! without invalidating a held handle.

use crate::config::Config;
use crate::entry::LogEntry;
use crate::fmt::{self, Formatter};
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

/// Where formatted records land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Standard output (the `"stdout"` config value).
    Stdout,
    /// A log file path, created lazily on first write.
    File(PathBuf),
}

/// A sink plus the formatter that renders entries for it.
pub struct Writer {
    target: Target,
    formatter: Box<dyn Formatter>,
}

impl Writer {
    #[must_use]
    pub fn new(target: Target, formatter: Box<dyn Formatter>) -> Self {
        Self { target, formatter }
    }

    /// Builds the writer the config describes: output path (or stdout) and
    /// the active format.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let target = match config.output_target() {
            Some(path) => Target::File(path),
            None => Target::Stdout,
        };
        Self::new(target, fmt::from_name(&config.format))
    }

    /// The file path this writer appends to, when it is file-backed.
    #[must_use]
    pub fn file_path(&self) -> Option<&Path> {
        match &self.target {
            Target::File(p) => Some(p),
            Target::Stdout => None,
        }
    }

    /// Formats the entry and appends it as one newline-terminated record.
    ///
    /// A file that cannot be opened falls back to stdout so the record is
    /// never silently dropped.
    ///
    /// # Errors
    /// Formatting failures and write errors on the fallback sink.
    pub fn write(&self, entry: &LogEntry) -> Result<(), crate::Error> {
        let mut record = self.formatter.format(entry)?;
        record.push('\n');

        match &self.target {
            Target::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(record.as_bytes())?;
            }
            Target::File(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.exists() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                match OpenOptions::new().create(true).append(true).open(path) {
                    Ok(mut file) => file.write_all(record.as_bytes())?,
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "log file unavailable, falling back to stdout"
                        );
                        let mut out = std::io::stdout().lock();
                        out.write_all(record.as_bytes())?;
                    }
                }
            }
        }
        Ok(())
    }
}
