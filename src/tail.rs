//! Polling follower for the active log file.
//!
//! No filesystem-event dependency: a short poll on file length is portable
//! and survives the rotation pattern, where the file is truncated in place
//! rather than replaced.

use std::io::{Read as _, Seek as _, SeekFrom, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Environment override for the poll interval, in milliseconds.
pub const TAIL_POLL_ENV: &str = "LOGWARDEN_TAIL_POLL_INTERVAL";

const DEFAULT_POLL: Duration = Duration::from_millis(500);

/// Follows a file from its current end, emitting appended bytes as they
/// arrive. A shrink of the file (rotation truncated it) resets the cursor
/// to the new start so no post-rotation record is missed.
pub struct Tailer {
    path: PathBuf,
    poll: Duration,
    stop: Arc<AtomicBool>,
}

impl Tailer {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            poll: poll_interval(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that ends [`run`](Self::run) after the current poll.
    #[must_use]
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Follows the file until the stop flag is set, writing appended bytes
    /// to `out`. The file must exist when the tailer starts.
    ///
    /// # Errors
    /// Opening the file and writing to `out`.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<(), crate::Error> {
        let mut position = std::fs::metadata(&self.path)?.len();
        let mut buf = Vec::new();

        while !self.stop.load(Ordering::SeqCst) {
            std::thread::sleep(self.poll);

            let len = match std::fs::metadata(&self.path) {
                Ok(meta) => meta.len(),
                // Transient: rotation may recreate the file next pass.
                Err(_) => continue,
            };
            if len < position {
                position = 0;
            }
            if len == position {
                continue;
            }

            let mut file = std::fs::File::open(&self.path)?;
            file.seek(SeekFrom::Start(position))?;
            buf.clear();
            file.read_to_end(&mut buf)?;
            position += buf.len() as u64;
            out.write_all(&buf)?;
            out.flush()?;
        }
        Ok(())
    }
}

fn poll_interval() -> Duration {
    std::env::var(TAIL_POLL_ENV)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(DEFAULT_POLL, Duration::from_millis)
}
