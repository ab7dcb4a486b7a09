//! Tests for configuration validation

use std::collections::HashMap;

use course_signup::config::{QueueConfig, ServiceConfig, StoreBackendConfig, TimerConfig};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_defaults_are_valid() {
    let cfg = ServiceConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.queue.capacity, 20_000);
    assert_eq!(cfg.timers.tick_interval_ms, 1000);
    assert_eq!(cfg.timers.preload_threshold_secs, 300);
    assert_eq!(cfg.timers.min_spacing_secs, 1795);
    assert_eq!(cfg.store, StoreBackendConfig::InMemory);
}

#[test]
fn test_invalid_queue_capacity() {
    let cfg = ServiceConfig {
        queue: QueueConfig { capacity: 0 },
        ..ServiceConfig::default()
    };
    assert!(cfg.validate().unwrap_err().starts_with("queue:"));
}

#[test]
fn test_invalid_timers() {
    let zero_tick = TimerConfig {
        tick_interval_ms: 0,
        ..TimerConfig::default()
    };
    assert!(zero_tick.validate().is_err());

    let preload_past_spacing = TimerConfig {
        preload_threshold_secs: 2000,
        ..TimerConfig::default()
    };
    assert!(preload_past_spacing.validate().is_err());

    let negative_preload = TimerConfig {
        preload_threshold_secs: -1,
        ..TimerConfig::default()
    };
    assert!(negative_preload.validate().is_err());
}

#[test]
fn test_json_partial_sections_use_defaults() {
    let cfg = ServiceConfig::from_json_str(
        r#"{"queue":{"capacity":64},"timers":{"tick_interval_ms":250},"store":"postgres"}"#,
    )
    .unwrap();
    assert_eq!(cfg.queue.capacity, 64);
    assert_eq!(cfg.timers.tick_interval_ms, 250);
    assert_eq!(cfg.timers.min_spacing_secs, 1795);
    assert_eq!(cfg.store, StoreBackendConfig::Postgres);
}

#[test]
fn test_json_rejects_invalid_values() {
    assert!(ServiceConfig::from_json_str(r#"{"queue":{"capacity":0}}"#).is_err());
    assert!(ServiceConfig::from_json_str("not json").is_err());
}

#[test]
fn test_lookup_overrides() {
    let cfg = ServiceConfig::from_lookup(lookup(&[
        ("SIGNUP_QUEUE_CAPACITY", "128"),
        ("SIGNUP_TICK_INTERVAL_MS", " 500 "),
        ("SIGNUP_PRELOAD_THRESHOLD_SECS", "120"),
        ("SIGNUP_MIN_SPACING_SECS", "600"),
        ("SIGNUP_STORE", "SQL"),
    ]))
    .unwrap();
    assert_eq!(cfg.queue.capacity, 128);
    assert_eq!(cfg.timers.tick_interval_ms, 500);
    assert_eq!(cfg.timers.preload_threshold_secs, 120);
    assert_eq!(cfg.timers.min_spacing_secs, 600);
    assert_eq!(cfg.store, StoreBackendConfig::Postgres);
}

#[test]
fn test_lookup_errors_name_the_variable() {
    let err = ServiceConfig::from_lookup(lookup(&[("SIGNUP_QUEUE_CAPACITY", "lots")])).unwrap_err();
    assert!(err.contains("SIGNUP_QUEUE_CAPACITY"));

    let err = ServiceConfig::from_lookup(lookup(&[("SIGNUP_STORE", "redis")])).unwrap_err();
    assert!(err.contains("redis"));
}

#[test]
fn test_lookup_without_overrides_is_default() {
    let cfg = ServiceConfig::from_lookup(|_| None).unwrap();
    assert_eq!(cfg, ServiceConfig::default());
}
