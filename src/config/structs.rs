//! Configuration struct definitions.
//!
//! Every field carries a default so an empty config file still produces a
//! working setup; key names follow the file format's camelCase convention.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Operating mode. Gates notifier fan-out and metric counters so the same
/// core can run as a CLI one-shot or as a daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Long-lived background process: fan-out and metrics active.
    Service,
    /// One-shot CLI invocation: write only.
    #[default]
    Standalone,
}

// An unrecognized mode string falls back to standalone rather than failing
// the whole config load.
impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(if s.eq_ignore_ascii_case("service") {
            Self::Service
        } else {
            Self::Standalone
        })
    }
}

/// Per-integration toggle; enabled integrations get their own HTTP routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationConfig {
    pub enabled: bool,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// One notifier registration. Replaced wholesale on every reload; never
/// patched in place.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct NotifierConfig {
    /// Transport discriminator: `http`, `bus`, or `desktop-bus`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Disabled notifiers stay registered but never fire.
    pub enabled: bool,
    /// Webhook target for the `http` kind.
    #[serde(rename = "webhookURL", alias = "webhookUrl")]
    pub webhook_url: String,
    /// HTTP method for the webhook call; empty means POST.
    pub http_method: String,
    /// Bearer token (http) or payload prefix (bus).
    pub auth_token: String,
    /// Minimum level that fires this notifier; empty means all levels.
    pub log_level: String,
    /// Socket endpoint for the `bus` kind (`host:port`).
    pub endpoint: String,
    /// Source whitelist; empty means all sources.
    pub whitelist: Vec<String>,
}

/// One immutable configuration snapshot. A reload builds a fresh `Config`
/// and swaps it in whole; consumers never see a half-updated view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// HTTP listener port.
    pub port: u16,
    /// HTTP listener bind address.
    pub bind_address: String,
    /// Name of the pid file under the per-user cache directory.
    pub pid_file: String,
    /// HTTP read timeout in seconds.
    pub read_timeout: u64,
    /// HTTP write timeout in seconds.
    pub write_timeout: u64,
    /// HTTP idle timeout in seconds.
    pub idle_timeout: u64,
    /// Log output: `"stdout"` or a file path. Empty selects the per-user
    /// default location.
    #[serde(alias = "output")]
    pub default_log_path: String,
    /// Operating mode.
    pub mode: Mode,
    /// Minimum log level name.
    pub level: String,
    /// Record format: `text` or `json`.
    pub format: String,
    /// Total-size rotation threshold in bytes.
    pub max_log_size: u64,
    /// Per-file rotation threshold in bytes.
    pub module_log_size: u64,
    /// HTTP route toggles per integration name.
    pub integrations: HashMap<String, IntegrationConfig>,
    /// Notifier registrations by name.
    pub notifiers: HashMap<String, NotifierConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 9999,
            bind_address: "0.0.0.0".to_string(),
            pid_file: "logwarden.pid".to_string(),
            read_timeout: 15,
            write_timeout: 15,
            idle_timeout: 60,
            default_log_path: "stdout".to_string(),
            mode: Mode::Standalone,
            level: "INFO".to_string(),
            format: "text".to_string(),
            max_log_size: 20 * 1024 * 1024,
            module_log_size: 5 * 1024 * 1024,
            integrations: HashMap::new(),
            notifiers: HashMap::new(),
        }
    }
}

impl Config {
    /// Minimum level, falling back to INFO when the config string is invalid.
    #[must_use]
    pub fn parse_level(&self) -> crate::Level {
        self.level.parse().unwrap_or_else(|_| {
            tracing::warn!(level = %self.level, "invalid level in config, using INFO");
            crate::Level::Info
        })
    }

    /// `bind:port` form the HTTP listener binds to.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Resolves the log sink. `None` means stdout. A file target has its
    /// directory and an empty file created lazily on first access so
    /// rotation and tailing always see a valid path.
    #[must_use]
    pub fn output_target(&self) -> Option<PathBuf> {
        if self.default_log_path == "stdout" {
            return None;
        }
        let path = if self.default_log_path.is_empty() {
            default_log_file()
        } else {
            PathBuf::from(shellexpand::tilde(&self.default_log_path).into_owned())
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), error = %e, "cannot create log directory");
                return None;
            }
        }
        if !path.exists() {
            if let Err(e) = std::fs::File::create(&path) {
                tracing::warn!(path = %path.display(), error = %e, "cannot create log file");
                return None;
            }
        }
        Some(path)
    }

    /// Directory the rotation policy scans, the file target's parent.
    #[must_use]
    pub fn log_dir(&self) -> Option<PathBuf> {
        self.output_target()
            .and_then(|p| p.parent().map(std::path::Path::to_path_buf))
    }
}

/// Default log file under the first usable base of
/// home → user config dir → user cache dir → /tmp.
fn default_log_file() -> PathBuf {
    let base = directories::UserDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .or_else(|| directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()))
        .or_else(|| directories::BaseDirs::new().map(|d| d.cache_dir().to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("/tmp"));
    base.join(".logwarden").join("logwarden.log")
}
