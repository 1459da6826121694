//! Configuration loading, path resolution, and the hot-reload watcher.
//!
//! Separated from the struct definitions so the loading logic (file I/O,
//! format inference, snapshot publication) stays independent of the serde
//! schema.

mod structs;

pub use structs::{Config, IntegrationConfig, Mode, NotifierConfig};

use crate::notify::NotifierManager;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime};

/// Environment override for the config file location.
pub const CONFIG_ENV: &str = "LOGWARDEN_CONFIG";
/// Environment override for the pid file location.
pub const PID_ENV: &str = "LOGWARDEN_PID_FILE";

/// Shared handle to the current configuration snapshot. Readers clone the
/// inner `Arc` and keep a consistent view for the duration of one call;
/// the reload path swaps the whole snapshot under the write lock.
#[derive(Debug, Clone, Default)]
pub struct ConfigHandle {
    inner: Arc<RwLock<Arc<Config>>>,
}

impl ConfigHandle {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    /// The current snapshot. Lock poisoning cannot occur outside a panic in
    /// the swap path, which holds the lock only for the pointer store.
    #[must_use]
    pub fn current(&self) -> Arc<Config> {
        self.inner
            .read()
            .map(|guard| Arc::clone(&guard))
            .unwrap_or_default()
    }

    /// Publishes a new snapshot.
    pub fn swap(&self, config: Config) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Arc::new(config);
        }
    }
}

/// Owns the config file path and the live snapshot handle.
#[derive(Debug)]
pub struct ConfigManager {
    path: PathBuf,
    handle: ConfigHandle,
}

impl ConfigManager {
    /// Resolves the config path (environment override, else the per-user
    /// config directory), creates the file with defaults if absent, parses
    /// it, and publishes the first snapshot.
    ///
    /// # Errors
    /// Path resolution, file creation, and parse failures, all fatal to
    /// startup per the error taxonomy.
    pub fn load() -> Result<Self, crate::Error> {
        let path = config_path()?;
        Self::load_from(path)
    }

    /// Same as [`load`](Self::load) with an explicit path, used by tests
    /// and by the daemon child, which inherits the parent's path.
    ///
    /// # Errors
    /// File creation and parse failures.
    pub fn load_from(path: PathBuf) -> Result<Self, crate::Error> {
        ensure_exists(&path)?;
        let config = parse_file(&path)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(Self {
            path,
            handle: ConfigHandle::new(config),
        })
    }

    #[must_use]
    pub fn handle(&self) -> ConfigHandle {
        self.handle.clone()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-parses the file and swaps the snapshot in.
    ///
    /// # Errors
    /// Parse failures; the previous snapshot stays live when reload fails.
    pub fn reload(&self) -> Result<Arc<Config>, crate::Error> {
        let config = parse_file(&self.path)?;
        self.handle.swap(config);
        Ok(self.handle.current())
    }

    /// Watcher task body: polls the file's mtime and, on change, reloads the
    /// snapshot and rebuilds the notifier registry from it. Runs until the
    /// daemon's runtime is torn down.
    pub async fn watch(self, notifiers: Arc<NotifierManager>, poll: Duration) {
        let mut last_modified = modified_at(&self.path);
        loop {
            tokio::time::sleep(poll).await;
            let modified = modified_at(&self.path);
            if modified == last_modified {
                continue;
            }
            last_modified = modified;
            match self.reload() {
                Ok(config) => {
                    tracing::info!(path = %self.path.display(), "configuration changed, reloading");
                    notifiers.update_from_config(&config);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "config reload failed, keeping previous snapshot");
                }
            }
        }
    }
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Config file location: environment override, else
/// `<user config dir>/logwarden/config.json`.
///
/// # Errors
/// `ConfigDirNotFound` when no per-user directory can be resolved.
pub fn config_path() -> Result<PathBuf, crate::Error> {
    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(shellexpand::tilde(&env_path).into_owned()));
    }
    let dirs = directories::ProjectDirs::from("", "", "logwarden")
        .ok_or(crate::Error::ConfigDirNotFound)?;
    Ok(dirs.config_dir().join("config.json"))
}

/// Pid file location: environment override, else the config's `pidFile`
/// name under `<user cache dir>/logwarden/`.
#[must_use]
pub fn pid_path(config: &Config) -> PathBuf {
    if let Ok(env_path) = std::env::var(PID_ENV) {
        return PathBuf::from(shellexpand::tilde(&env_path).into_owned());
    }
    let base = directories::ProjectDirs::from("", "", "logwarden")
        .map_or_else(|| PathBuf::from("/tmp"), |d| d.cache_dir().to_path_buf());
    base.join(&config.pid_file)
}

/// Creates the file with serialized defaults when absent, so first runs
/// work without manual setup.
fn ensure_exists(path: &Path) -> Result<(), crate::Error> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let defaults = serde_json::to_string_pretty(&Config::default())?;
    std::fs::write(path, defaults)?;
    tracing::info!(path = %path.display(), "created default config");
    Ok(())
}

/// Parses the file, inferring the format from its extension. JSON is the
/// default for unknown or missing extensions.
fn parse_file(path: &Path) -> Result<Config, crate::Error> {
    let content = std::fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("json")
        .to_ascii_lowercase();
    match ext.as_str() {
        "yaml" | "yml" => Ok(serde_yaml::from_str(&content)?),
        "toml" => Ok(toml::from_str(&content)?),
        "ini" => Err(crate::Error::UnsupportedConfigFormat(ext)),
        _ => Ok(serde_json::from_str(&content)?),
    }
}
