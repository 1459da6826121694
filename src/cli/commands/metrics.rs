//! Metrics subcommands against the persisted store.

use super::parse_pair;
use crate::cli::MetricsAction;
use crate::config::Config;
use crate::metrics::MetricsStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const WATCH_POLL: Duration = Duration::from_secs(2);

/// Dispatches one `metrics` subcommand. `Watch` and `Enable` block until
/// the process is interrupted.
///
/// # Errors
/// Metric name validation and listener failures.
pub fn cmd_metrics(action: &MetricsAction, config: &Config) -> Result<(), crate::Error> {
    let store = Arc::new(MetricsStore::open_default());
    match action {
        MetricsAction::Add {
            name,
            value,
            metadata,
        } => {
            let mut map = HashMap::new();
            for raw in metadata {
                let (key, val) = parse_pair(raw)?;
                map.insert(key.to_string(), val.to_string());
            }
            store.add_metric(name, *value, map)?;
            println!("{name} = {value}");
            Ok(())
        }
        MetricsAction::Remove { name } => {
            store.remove_metric(name);
            println!("removed {name}");
            Ok(())
        }
        MetricsAction::Increment { name, delta } => {
            store.increment_metric(name, *delta)?;
            let value = store.get_metrics().get(name.as_str()).copied().unwrap_or(0.0);
            println!("{name} = {value}");
            Ok(())
        }
        MetricsAction::List => {
            for (name, metric) in store.list_metrics() {
                if metric.metadata.is_empty() {
                    println!("{name} = {}", metric.value);
                } else {
                    println!("{name} = {} {:?}", metric.value, metric.metadata);
                }
            }
            Ok(())
        }
        MetricsAction::Watch => {
            watch(&store);
        }
        MetricsAction::Enable { port } => {
            let port = port.unwrap_or(config.port);
            store.enable(port)?;
            println!("serving metrics on port {port}");
            loop {
                std::thread::sleep(Duration::from_secs(3600));
            }
        }
        MetricsAction::Disable => {
            store.disable();
            println!("metrics exposition disabled");
            Ok(())
        }
    }
}

/// Polls the persisted store and reprints the snapshot when it changes.
/// Other processes mutate the file, so each pass re-reads it from disk.
fn watch(store: &MetricsStore) -> ! {
    let mut last: Option<Vec<(String, f64)>> = None;
    loop {
        let fresh = MetricsStore::open(store.file_path().to_path_buf());
        let snapshot: Vec<(String, f64)> = fresh
            .list_metrics()
            .into_iter()
            .map(|(name, metric)| (name, metric.value))
            .collect();
        if last.as_ref() != Some(&snapshot) {
            println!("--- {}", chrono::Utc::now().to_rfc3339());
            for (name, value) in &snapshot {
                println!("{name} = {value}");
            }
            last = Some(snapshot);
        }
        std::thread::sleep(WATCH_POLL);
    }
}
