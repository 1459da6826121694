//! Named numeric gauges with disk persistence and a Prometheus-style
//! exposition endpoint.
//!
//! Every mutation re-serializes the whole map to the backing file inside the
//! same exclusive section, so a reader never observes an in-memory value
//! whose persisted form lags behind. Simple over fast; the map is small.

mod http;

pub use http::{exposition_response, ExpositionServer};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock};

/// Environment override for the metrics persistence file.
pub const METRICS_FILE_ENV: &str = "LOGWARDEN_METRICS_FILE";

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^[a-zA-Z_:][a-zA-Z0-9_:]*$").expect("valid pattern"))
}

/// One gauge: a float value plus optional string metadata.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Metric {
    pub value: f64,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

#[derive(Default)]
struct Inner {
    metrics: HashMap<String, Metric>,
    export_whitelist: HashSet<String>,
}

/// Persisted, lockable map of named gauges.
pub struct MetricsStore {
    inner: RwLock<Inner>,
    file: PathBuf,
    enabled: AtomicBool,
    server: Mutex<Option<ExpositionServer>>,
}

impl MetricsStore {
    /// Opens the store backed by `file`, rehydrating any persisted state.
    /// A missing file is a fresh store; a corrupt file is reported and
    /// replaced on the next mutation.
    #[must_use]
    pub fn open(file: PathBuf) -> Self {
        let metrics = match std::fs::read_to_string(&file) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(loaded) => loaded,
                Err(e) => {
                    tracing::warn!(path = %file.display(), error = %e, "metrics file unreadable, starting empty");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self {
            inner: RwLock::new(Inner {
                metrics,
                export_whitelist: HashSet::new(),
            }),
            file,
            enabled: AtomicBool::new(false),
            server: Mutex::new(None),
        }
    }

    /// Opens the store at the default location (environment override, else
    /// the per-user cache directory).
    #[must_use]
    pub fn open_default() -> Self {
        Self::open(metrics_path())
    }

    /// Validates a metric name against the Prometheus naming rules.
    ///
    /// # Errors
    /// `InvalidMetricName` when the name does not match.
    pub fn validate_name(name: &str) -> Result<(), crate::Error> {
        if name_pattern().is_match(name) {
            Ok(())
        } else {
            Err(crate::Error::InvalidMetricName(name.to_string()))
        }
    }

    /// Adds or replaces a gauge. Rejected names leave the store unchanged.
    ///
    /// # Errors
    /// `InvalidMetricName`; persistence failures are logged, not returned,
    /// so a full disk cannot take down the caller.
    pub fn add_metric(
        &self,
        name: &str,
        value: f64,
        metadata: HashMap<String, String>,
    ) -> Result<(), crate::Error> {
        Self::validate_name(name)?;
        let mut inner = self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner
            .metrics
            .insert(name.to_string(), Metric { value, metadata });
        self.persist(&inner);
        Ok(())
    }

    /// Removes a gauge; removing an absent name is a no-op.
    pub fn remove_metric(&self, name: &str) {
        let mut inner = self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.metrics.remove(name);
        self.persist(&inner);
    }

    /// Adds `delta` to a gauge, creating it at zero first when absent.
    ///
    /// # Errors
    /// `InvalidMetricName`; the store is left unchanged.
    pub fn increment_metric(&self, name: &str, delta: f64) -> Result<(), crate::Error> {
        Self::validate_name(name)?;
        let mut inner = self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.metrics.entry(name.to_string()).or_default().value += delta;
        self.persist(&inner);
        Ok(())
    }

    /// Current values, filtered by the export whitelist when one is set.
    #[must_use]
    pub fn get_metrics(&self) -> HashMap<String, f64> {
        let inner = self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner
            .metrics
            .iter()
            .filter(|(name, _)| {
                inner.export_whitelist.is_empty() || inner.export_whitelist.contains(*name)
            })
            .map(|(name, metric)| (name.clone(), metric.value))
            .collect()
    }

    /// Full gauge list, sorted by name for stable output.
    #[must_use]
    pub fn list_metrics(&self) -> Vec<(String, Metric)> {
        let inner = self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut entries: Vec<_> = inner
            .metrics
            .iter()
            .map(|(n, m)| (n.clone(), m.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Restricts exposition to the named metrics; an empty list exports all.
    pub fn set_export_whitelist(&self, names: &[String]) {
        let mut inner = self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.export_whitelist = names.iter().cloned().collect();
    }

    /// Whether exposition is currently enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Starts the exposition listener on `port`. Idempotent: a second call
    /// warns and changes nothing.
    ///
    /// # Errors
    /// Listener bind failures.
    pub fn enable(self: &Arc<Self>, port: u16) -> Result<(), crate::Error> {
        if self.enabled.swap(true, Ordering::SeqCst) {
            tracing::warn!("metrics exposition already enabled");
            return Ok(());
        }
        let server = match ExpositionServer::start(Arc::clone(self), port) {
            Ok(server) => server,
            Err(e) => {
                self.enabled.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };
        *self.server.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(server);
        tracing::info!(port, "metrics exposition enabled");
        Ok(())
    }

    /// Marks exposition enabled without a dedicated listener; the daemon
    /// serves `/metrics` on its own listener.
    pub fn enable_inline(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    /// Stops the listener and disables exposition. Idempotent.
    pub fn disable(&self) {
        if !self.enabled.swap(false, Ordering::SeqCst) {
            tracing::warn!("metrics exposition already disabled");
            return;
        }
        if let Some(server) = self
            .server
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take()
        {
            server.shutdown();
        }
        tracing::info!("metrics exposition disabled");
    }

    /// Prometheus text exposition: one gauge per metric, sorted by name.
    #[must_use]
    pub fn exposition(&self) -> String {
        let metrics = self.get_metrics();
        let mut names: Vec<_> = metrics.keys().collect();
        names.sort();
        let mut body = String::new();
        for name in names {
            let value = metrics[name];
            body.push_str(&format!(
                "# HELP {name} Gauge exported by logwarden\n# TYPE {name} gauge\n{name} {value}\n"
            ));
        }
        body
    }

    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file
    }

    // Called with the write lock held so value and persisted file move
    // together. Write-then-rename keeps the file whole under a crash.
    fn persist(&self, inner: &Inner) {
        let result = (|| -> Result<(), crate::Error> {
            if let Some(parent) = self.file.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let data = serde_json::to_string_pretty(&inner.metrics)?;
            let tmp = self.file.with_extension("json.tmp");
            std::fs::write(&tmp, data)?;
            std::fs::rename(&tmp, &self.file)?;
            Ok(())
        })();
        if let Err(e) = result {
            tracing::warn!(path = %self.file.display(), error = %e, "failed to persist metrics");
        }
    }
}

/// Metrics file location: environment override, else
/// `<user cache dir>/logwarden/metrics.json`.
#[must_use]
pub fn metrics_path() -> PathBuf {
    if let Ok(env_path) = std::env::var(METRICS_FILE_ENV) {
        return PathBuf::from(shellexpand::tilde(&env_path).into_owned());
    }
    let base = directories::ProjectDirs::from("", "", "logwarden")
        .map_or_else(|| PathBuf::from("/tmp"), |d| d.cache_dir().to_path_buf());
    base.join("metrics.json")
}
