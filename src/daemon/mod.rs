//! Daemon lifecycle: single-instance pid file, start/stop/status, and the
//! detached spawn path.

mod server;

pub use server::{router, run};

use crate::config::{self, Config};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[cfg(unix)]
use nix::fcntl::{Flock, FlockArg};
#[cfg(unix)]
use nix::sys::signal::{kill, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Margin on top of the daemon's own drain window before `stop` gives up.
const STOP_MARGIN: Duration = Duration::from_secs(5);

/// The held pid file: an exclusive lock plus the recorded `pid` and `port`.
/// The lock is released and the file removed when this is dropped, so a
/// clean daemon exit always leaves no pid file behind.
pub struct PidFile {
    path: PathBuf,
    #[cfg(unix)]
    lock: Option<Flock<std::fs::File>>,
    #[cfg(not(unix))]
    lock: Option<std::fs::File>,
}

impl PidFile {
    /// Claims the pid file for this process. An existing file means another
    /// instance owns the path; a stale file from a crashed instance is not
    /// reclaimed and must be removed by the operator.
    ///
    /// # Errors
    /// `AlreadyRunning` when the file exists, `PidFileLocked` when another
    /// process holds the lock, plus file I/O failures.
    pub fn acquire(path: PathBuf, port: u16) -> Result<Self, crate::Error> {
        if path.exists() {
            return Err(crate::Error::AlreadyRunning(path));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&path)?;

        #[cfg(unix)]
        let mut lock = match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(lock) => lock,
            Err((_, _)) => return Err(crate::Error::PidFileLocked),
        };
        #[cfg(not(unix))]
        let mut lock = file;

        writeln!(lock, "{}", std::process::id())?;
        writeln!(lock, "{port}")?;
        lock.flush()?;
        tracing::debug!(path = %path.display(), "pid file acquired");
        Ok(Self {
            path,
            lock: Some(lock),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for PidFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PidFile")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        // Unlock before unlink so a racing starter sees a consistent state.
        drop(self.lock.take());
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove pid file");
        }
    }
}

/// Reads `pid` and `port` from a pid file.
///
/// # Errors
/// `NotRunning` when the file is absent or malformed.
pub fn read_pid_file(path: &Path) -> Result<(i32, u16), crate::Error> {
    let content =
        std::fs::read_to_string(path).map_err(|_| crate::Error::NotRunning(path.to_path_buf()))?;
    let mut lines = content.lines();
    let pid = lines
        .next()
        .and_then(|l| l.trim().parse::<i32>().ok())
        .ok_or_else(|| crate::Error::NotRunning(path.to_path_buf()))?;
    let port = lines
        .next()
        .and_then(|l| l.trim().parse::<u16>().ok())
        .ok_or_else(|| crate::Error::NotRunning(path.to_path_buf()))?;
    Ok((pid, port))
}

/// What `status` reports about the recorded instance.
#[derive(Debug, Clone, Copy)]
pub struct Status {
    pub pid: i32,
    pub port: u16,
    pub alive: bool,
}

/// Reads the pid file and probes whether the recorded process still exists.
///
/// # Errors
/// `NotRunning` when there is no usable pid file.
pub fn status(config: &Config) -> Result<Status, crate::Error> {
    let path = config::pid_path(config);
    let (pid, port) = read_pid_file(&path)?;
    Ok(Status {
        pid,
        port,
        alive: process_alive(pid),
    })
}

/// Stops the running instance: SIGTERM to the recorded pid, then waits for
/// the pid file to disappear, which the dying daemon does on its way out.
///
/// A recorded process that no longer exists (crashed or SIGKILLed, so its
/// `Drop` never ran) is treated as already stopped and its pid file is
/// removed here.
///
/// # Errors
/// `NotRunning` without a pid file, `Signal` when the kill fails against a
/// live process, and `ShutdownTimeout` when a live process outlives the
/// grace period.
pub fn stop(config: &Config) -> Result<(), crate::Error> {
    let path = config::pid_path(config);
    let (pid, _) = read_pid_file(&path)?;
    if let Err(e) = signal_terminate(pid) {
        if process_alive(pid) {
            return Err(e);
        }
        std::fs::remove_file(&path)?;
        tracing::info!(pid, path = %path.display(), "removed pid file of a dead instance");
        return Ok(());
    }
    tracing::info!(pid, "sent termination signal");

    let deadline = Instant::now() + Duration::from_secs(config.idle_timeout) + STOP_MARGIN;
    while path.exists() {
        if Instant::now() >= deadline {
            if process_alive(pid) {
                return Err(crate::Error::ShutdownTimeout);
            }
            std::fs::remove_file(&path)?;
            tracing::warn!(pid, path = %path.display(), "instance exited without removing its pid file");
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    Ok(())
}

/// Re-executes this binary as a detached child running the daemon loop.
/// The child inherits the environment, so config overrides carry over.
///
/// # Errors
/// Resolving the current executable and spawning the child.
pub fn spawn_detached() -> Result<u32, crate::Error> {
    let exe = std::env::current_exe()?;
    let child = std::process::Command::new(exe)
        .args(["service", "run"])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()?;
    Ok(child.id())
}

#[cfg(unix)]
fn signal_terminate(pid: i32) -> Result<(), crate::Error> {
    kill(Pid::from_raw(pid), Signal::SIGTERM)
        .map_err(|e| crate::Error::Signal(format!("kill({pid}, SIGTERM): {e}")))
}

#[cfg(not(unix))]
fn signal_terminate(pid: i32) -> Result<(), crate::Error> {
    Err(crate::Error::Signal(format!(
        "termination of pid {pid} is not supported on this platform"
    )))
}

#[cfg(unix)]
fn process_alive(pid: i32) -> bool {
    kill(Pid::from_raw(pid), None).is_ok()
}

#[cfg(not(unix))]
fn process_alive(_pid: i32) -> bool {
    false
}
