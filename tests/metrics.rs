//! Tests for the metrics store: naming rules, persistence, exposition.

use logwarden::{Error, MetricsStore};
use std::collections::HashMap;
use tempfile::tempdir;

#[test]
fn names_follow_prometheus_rules() {
    assert!(MetricsStore::validate_name("logs_total").is_ok());
    assert!(MetricsStore::validate_name("ns:requests_total").is_ok());
    assert!(MetricsStore::validate_name("_private").is_ok());

    assert!(matches!(
        MetricsStore::validate_name("9leading_digit"),
        Err(Error::InvalidMetricName(_))
    ));
    assert!(matches!(
        MetricsStore::validate_name("has-dash"),
        Err(Error::InvalidMetricName(_))
    ));
    assert!(matches!(
        MetricsStore::validate_name(""),
        Err(Error::InvalidMetricName(_))
    ));
}

#[test]
fn rejected_names_leave_store_unchanged() {
    let dir = tempdir().unwrap();
    let store = MetricsStore::open(dir.path().join("metrics.json"));
    assert!(store.add_metric("bad name", 1.0, HashMap::new()).is_err());
    assert!(store.get_metrics().is_empty());
}

#[test]
fn mutations_survive_reopen() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("metrics.json");

    let store = MetricsStore::open(file.clone());
    store.add_metric("queue_depth", 7.5, HashMap::new()).unwrap();
    store.increment_metric("events_total", 3.0).unwrap();

    let reopened = MetricsStore::open(file);
    let metrics = reopened.get_metrics();
    assert_eq!(metrics["queue_depth"], 7.5);
    assert_eq!(metrics["events_total"], 3.0);
}

#[test]
fn increment_creates_at_zero() {
    let dir = tempdir().unwrap();
    let store = MetricsStore::open(dir.path().join("metrics.json"));
    store.increment_metric("hits", 1.0).unwrap();
    store.increment_metric("hits", 1.0).unwrap();
    assert_eq!(store.get_metrics()["hits"], 2.0);
}

#[test]
fn remove_is_idempotent() {
    let dir = tempdir().unwrap();
    let store = MetricsStore::open(dir.path().join("metrics.json"));
    store.add_metric("gone", 1.0, HashMap::new()).unwrap();
    store.remove_metric("gone");
    store.remove_metric("gone");
    assert!(store.get_metrics().is_empty());
}

#[test]
fn metadata_is_persisted() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("metrics.json");
    let mut meta = HashMap::new();
    meta.insert("unit".to_string(), "bytes".to_string());

    let store = MetricsStore::open(file.clone());
    store.add_metric("cache_size", 512.0, meta).unwrap();

    let reopened = MetricsStore::open(file);
    let listed = reopened.list_metrics();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].0, "cache_size");
    assert_eq!(listed[0].1.metadata["unit"], "bytes");
}

#[test]
fn export_whitelist_filters_get_metrics() {
    let dir = tempdir().unwrap();
    let store = MetricsStore::open(dir.path().join("metrics.json"));
    store.add_metric("visible", 1.0, HashMap::new()).unwrap();
    store.add_metric("hidden", 2.0, HashMap::new()).unwrap();

    store.set_export_whitelist(&["visible".to_string()]);
    let metrics = store.get_metrics();
    assert_eq!(metrics.len(), 1);
    assert!(metrics.contains_key("visible"));

    store.set_export_whitelist(&[]);
    assert_eq!(store.get_metrics().len(), 2);
}

#[test]
fn corrupt_file_starts_empty() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("metrics.json");
    std::fs::write(&file, "{not json").unwrap();

    let store = MetricsStore::open(file);
    assert!(store.get_metrics().is_empty());
}

#[test]
fn exposition_is_sorted_gauge_text() {
    let dir = tempdir().unwrap();
    let store = MetricsStore::open(dir.path().join("metrics.json"));
    store.add_metric("beta", 2.0, HashMap::new()).unwrap();
    store.add_metric("alpha", 1.0, HashMap::new()).unwrap();

    let body = store.exposition();
    let alpha = body.find("alpha 1").unwrap();
    let beta = body.find("beta 2").unwrap();
    assert!(alpha < beta);
    assert!(body.contains("# HELP alpha"));
    assert!(body.contains("# TYPE alpha gauge"));
}

#[test]
fn enable_inline_toggles_state() {
    let dir = tempdir().unwrap();
    let store = MetricsStore::open(dir.path().join("metrics.json"));
    assert!(!store.is_enabled());
    store.enable_inline();
    assert!(store.is_enabled());
    store.disable();
    assert!(!store.is_enabled());
}
