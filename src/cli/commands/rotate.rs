//! Rotation and archiving subcommands.

use crate::config::Config;
use crate::rotate;

/// Archives every log file regardless of size.
///
/// # Errors
/// Archive creation failures.
pub fn cmd_rotate(config: &Config) -> Result<(), crate::Error> {
    let archives = rotate::rotate_all(config)?;
    if archives.is_empty() {
        println!("no log files to rotate");
    }
    for archive in archives {
        println!("rotated to {}", archive.display());
    }
    Ok(())
}

/// Runs the threshold check once, rotating whatever crossed a limit.
///
/// # Errors
/// Directory scans and archive creation failures.
pub fn cmd_check_size(config: &Config) -> Result<(), crate::Error> {
    rotate::check_log_size(config)?;
    println!("size check complete");
    Ok(())
}

/// Bundles all log files into one zip archive.
///
/// # Errors
/// Archive creation failures; logging to stdout has no directory to bundle.
pub fn cmd_archive(config: &Config) -> Result<(), crate::Error> {
    let Some(dir) = config.log_dir() else {
        return Err(crate::Error::Archive(
            "log output is stdout, nothing to archive".into(),
        ));
    };
    let archive = rotate::archive_logs(&dir)?;
    println!("archived to {}", archive.display());
    Ok(())
}
