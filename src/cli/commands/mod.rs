//! One function per subcommand; the binary maps their results to exit codes.

mod log;
mod metrics;
mod rotate;
mod service;
mod watch;

pub use log::cmd_log;
pub use metrics::cmd_metrics;
pub use rotate::{cmd_archive, cmd_check_size, cmd_rotate};
pub use service::cmd_service;
pub use watch::cmd_watch;

use crate::config::ConfigHandle;
use crate::logger::Logger;
use crate::metrics::MetricsStore;
use crate::notify::NotifierManager;
use std::sync::Arc;

/// One-shot commands share the same logger stack the daemon uses, built
/// from the loaded config snapshot.
#[must_use]
pub fn build_logger(handle: ConfigHandle) -> Arc<Logger> {
    let notifiers = Arc::new(NotifierManager::new());
    notifiers.update_from_config(&handle.current());
    let metrics = Arc::new(MetricsStore::open_default());
    Arc::new(Logger::new(handle, notifiers, metrics))
}

/// Splits a `key=value` CLI argument.
pub(crate) fn parse_pair(raw: &str) -> Result<(&str, &str), crate::Error> {
    raw.split_once('=')
        .ok_or_else(|| crate::Error::InvalidEntry(format!("expected key=value, got '{raw}'")))
}
