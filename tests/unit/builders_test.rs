//! Tests for service builders

use std::sync::Arc;
use std::time::Duration;

use course_signup::builders::{build_store, SignupService};
use course_signup::config::{QueueConfig, ServiceConfig, StoreBackendConfig, TimerConfig};
use course_signup::core::{CourseRecord, PersistenceError, PersistencePort};
use course_signup::infra::InMemoryStore;
use course_signup::runtime::TokioSpawner;

#[test]
fn test_from_config_in_memory() {
    let service = SignupService::from_config(&ServiceConfig::default()).unwrap();
    assert!(service.registry.is_empty());
    assert_eq!(service.queue.stats().capacity, 20_000);
    assert_eq!(service.scheduler.pending(), 0);
    service.shutdown();
}

#[test]
fn test_invalid_config_is_rejected() {
    let cfg = ServiceConfig {
        queue: QueueConfig { capacity: 0 },
        ..ServiceConfig::default()
    };
    let err = SignupService::from_config(&cfg).err().unwrap();
    assert!(err.to_string().contains("config invalid"));
}

#[test]
fn test_components_share_one_registry() {
    let store = Arc::new(InMemoryStore::new());
    let service = SignupService::with_port(&ServiceConfig::default(), store).unwrap();
    service
        .scheduler
        .set_timer_in("north", "clubs", "clubs_2026", 3600)
        .unwrap();
    assert!(Arc::ptr_eq(service.admission.registry(), &service.registry));
    assert!(service.registry.get("north").is_some());
    service.shutdown();
}

#[tokio::test]
async fn test_postgres_backend_reports_unwired() {
    let port = build_store(&StoreBackendConfig::Postgres);
    let err = port.load_courses("north", "clubs").await.unwrap_err();
    assert!(matches!(err, PersistenceError::Backend(_)));
}

#[tokio::test]
async fn test_in_memory_backend_serves_seeded_catalog() {
    let store = InMemoryStore::new().with_catalog(
        "north",
        "clubs",
        vec![CourseRecord::new("chess", "Li", 3, [1])],
    );
    let courses = store.load_courses("north", "clubs").await.unwrap();
    assert_eq!(courses.len(), 1);
    assert!(matches!(
        store.load_courses("north", "arts").await,
        Err(PersistenceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_start_after_shutdown_does_not_tick() {
    let store = Arc::new(InMemoryStore::new().with_catalog(
        "north",
        "clubs",
        vec![CourseRecord::new("chess", "Li", 3, [1])],
    ));
    let cfg = ServiceConfig {
        timers: TimerConfig {
            tick_interval_ms: 5,
            ..TimerConfig::default()
        },
        ..ServiceConfig::default()
    };
    let service = SignupService::with_port(&cfg, store).unwrap();
    service
        .scheduler
        .set_timer_in("north", "clubs", "clubs", 1)
        .unwrap();

    service.shutdown();
    service.start(&TokioSpawner::current());
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(service.scheduler.pending(), 1);
    assert!(!service.registry.get("north").unwrap().is_started());
}
