//! Size-based log rotation and archiving.
//!
//! Two independent triggers, checked in this order on every pass:
//! the combined size of all `.log` files in the log directory against
//! `maxLogSize` (bundle everything into one zip and truncate), and each
//! individual file against `moduleLogSize` (compress that file to a
//! `.tar.gz` sibling and truncate it). A file can therefore be archived
//! twice in one pass; both archives stay valid.

use crate::config::Config;
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File, OpenOptions};
use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};

/// Checks both size triggers for the configured log directory and rotates
/// whatever crossed its threshold. A stdout-only configuration is a no-op.
///
/// # Errors
/// Directory scans and archive creation failures.
pub fn check_log_size(config: &Config) -> Result<(), crate::Error> {
    let Some(dir) = config.log_dir() else {
        return Ok(());
    };

    let files = log_files(&dir)?;
    let total: u64 = files.iter().map(|(_, size)| size).sum();
    if total > config.max_log_size {
        let archive = archive_logs(&dir)?;
        tracing::info!(
            total,
            archive = %archive.display(),
            "total log size exceeded threshold, archived all logs"
        );
    }

    // Re-scan: the bundle pass truncated everything it archived.
    for (path, size) in log_files(&dir)? {
        if size > config.module_log_size {
            let archive = rotate_file(&path)?;
            tracing::info!(
                path = %path.display(),
                size,
                archive = %archive.display(),
                "log file exceeded threshold, rotated"
            );
        }
    }
    Ok(())
}

/// Rotates every `.log` file in the configured log directory regardless of
/// size. Backs the explicit `rotate` operation.
///
/// # Errors
/// Directory scans and archive creation failures.
pub fn rotate_all(config: &Config) -> Result<Vec<PathBuf>, crate::Error> {
    let Some(dir) = config.log_dir() else {
        return Ok(Vec::new());
    };
    let mut archives = Vec::new();
    for (path, _) in log_files(&dir)? {
        archives.push(rotate_file(&path)?);
    }
    Ok(archives)
}

/// Bundles every `.log` file in `dir` into one zip under the system temp
/// directory, then truncates the originals. Returns the archive path.
///
/// # Errors
/// Zip creation and file I/O failures.
pub fn archive_logs(dir: &Path) -> Result<PathBuf, crate::Error> {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    let archive_path = std::env::temp_dir().join(format!("logs_archive_{stamp}.zip"));

    let files = log_files(dir)?;
    let archive = File::create(&archive_path)?;
    let mut zip = zip::ZipWriter::new(archive);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for (path, _) in &files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| crate::Error::Archive(format!("bad file name: {}", path.display())))?;
        zip.start_file(name, options)
            .map_err(|e| crate::Error::Archive(format!("zip {name}: {e}")))?;
        let mut contents = Vec::new();
        File::open(path)?.read_to_end(&mut contents)?;
        zip.write_all(&contents)?;
    }
    zip.finish()
        .map_err(|e| crate::Error::Archive(format!("zip finish: {e}")))?;

    for (path, _) in &files {
        truncate(path)?;
    }
    Ok(archive_path)
}

/// Compresses one log file to a `.tar.gz` sibling and truncates it in
/// place, keeping the path valid for writers holding it.
///
/// # Errors
/// Archive creation and file I/O failures.
pub fn rotate_file(path: &Path) -> Result<PathBuf, crate::Error> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| crate::Error::Archive(format!("bad file name: {}", path.display())))?;
    let archive_path = path.with_extension("tar.gz");

    let archive = File::create(&archive_path)?;
    let encoder = GzEncoder::new(archive, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    let mut file = File::open(path)?;
    builder
        .append_file(name, &mut file)
        .map_err(|e| crate::Error::Archive(format!("tar {name}: {e}")))?;
    builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .map_err(|e| crate::Error::Archive(format!("tar finish: {e}")))?;

    truncate(path)?;
    Ok(archive_path)
}

/// `.log` files in `dir` with their sizes. A missing directory is empty,
/// not an error.
fn log_files(dir: &Path) -> Result<Vec<(PathBuf, u64)>, crate::Error> {
    let mut files = Vec::new();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
        Err(e) => return Err(e.into()),
    };
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("log") && path.is_file() {
            files.push((path, entry.metadata()?.len()));
        }
    }
    files.sort();
    Ok(files)
}

fn truncate(path: &Path) -> Result<(), crate::Error> {
    OpenOptions::new().write(true).truncate(true).open(path)?;
    Ok(())
}
