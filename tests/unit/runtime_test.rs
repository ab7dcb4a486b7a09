//! Tests for the tokio spawner and the API surface

use std::sync::Arc;

use course_signup::builders::SignupService;
use course_signup::config::ServiceConfig;
use course_signup::core::{CourseRecord, SignupError, Spawn};
use course_signup::infra::InMemoryStore;
use course_signup::runtime::api;
use course_signup::runtime::tokio_spawner::TokioSpawner;
use course_signup::runtime::{RegisterRequest, Reply, SetTimerRequest};

fn open_service() -> SignupService {
    let service =
        SignupService::with_port(&ServiceConfig::default(), Arc::new(InMemoryStore::new())).unwrap();
    let school = service.registry.get_or_create("north").unwrap();
    school.replace_catalog(vec![CourseRecord::new("chess", "Li", 1, [1, 2, 3])]);
    school.open("clubs");
    service
}

fn request(student: &str) -> RegisterRequest {
    RegisterRequest {
        school: "north".into(),
        student: student.into(),
        course: "chess".into(),
    }
}

fn timer(at: Option<&str>, seconds: Option<i64>) -> SetTimerRequest {
    SetTimerRequest {
        school: "north".into(),
        category: "arts".into(),
        table: "arts_2026".into(),
        at: at.map(str::to_owned),
        seconds,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[test]
fn test_reply_carries_error_code() {
    let reply = Reply::from(SignupError::Full);
    assert_eq!(reply.code, 13);
    assert!(!reply.is_ok());
    assert!(Reply::ok("done").is_ok());
}

#[test]
fn test_register_and_cancel_replies() {
    let service = open_service();

    assert!(api::register(&service, &request("240001")).is_ok());
    assert_eq!(api::register(&service, &request("240002")).code, 13);
    assert_eq!(api::cancel(&service, &request("240002")).code, 15);
    assert!(api::cancel(&service, &request("240001")).is_ok());
    service.shutdown();
}

#[test]
fn test_status_and_registration_info() {
    let service = open_service();

    let status = api::status(&service, "north").unwrap();
    assert_eq!(status.status, "started");
    assert_eq!(status.course_tag, "clubs");

    assert_eq!(api::registration_info(&service, "north", "240001").unwrap().course, "");
    api::register(&service, &request("240001"));
    assert_eq!(
        api::registration_info(&service, "north", "240001").unwrap().course,
        "chess"
    );

    let err = api::status(&service, "").unwrap_err();
    assert_eq!(err.code, 1);
    service.shutdown();
}

#[test]
fn test_status_reports_not_started() {
    let service = SignupService::from_config(&ServiceConfig::default()).unwrap();
    let status = api::status(&service, "south").unwrap();
    let json = serde_json::to_value(&status).unwrap();
    assert_eq!(json["status"], "notStarted");
    assert_eq!(json["course_tag"], "");
    service.shutdown();
}

#[test]
fn test_list_courses() {
    let service = open_service();
    // Unknown grade years simply list nothing.
    assert!(api::list_courses(&service, "north", "990001").unwrap().data.is_empty());
    assert_eq!(api::list_courses(&service, "north", "").unwrap_err().code, 2);
    service.shutdown();
}

#[test]
fn test_set_timer_variants() {
    let service = open_service();

    assert_eq!(api::set_timer(&service, &timer(None, None)).code, 2);
    assert_eq!(api::set_timer(&service, &timer(Some("7pm"), None)).code, 20);
    assert_eq!(api::set_timer(&service, &timer(None, Some(-5))).code, 20);
    assert!(api::set_timer(&service, &timer(None, Some(3600))).is_ok());

    let timers = api::get_timers(&service, "north").unwrap().timers;
    assert_eq!(timers.len(), 1);
    assert_eq!(timers[0].category, "arts");
    assert_eq!(timers[0].remaining, "01:00:00");

    assert_eq!(api::health(&service).pending_timers, 1);
    assert!(api::remove_timer(&service, "north", "arts").is_ok());
    assert_eq!(api::remove_timer(&service, "north", "arts").code, 23);
    service.shutdown();
}

#[tokio::test]
async fn test_history_reads_storage() {
    let store = Arc::new(InMemoryStore::new());
    let service = SignupService::with_port(&ServiceConfig::default(), store.clone()).unwrap();
    let school = service.registry.get_or_create("north").unwrap();
    school.replace_catalog(vec![CourseRecord::new("chess", "Li", 1, [1, 2, 3])]);
    school.open("clubs");

    api::register(&service, &request("240001"));
    let queue = Arc::clone(&service.queue);
    tokio::task::spawn_blocking(move || queue.flush())
        .await
        .unwrap()
        .unwrap();

    let history = api::history(&service, "north", "240001").await.unwrap();
    assert_eq!(history.data.len(), 1);
    assert_eq!(history.data[0].teacher, "Li");

    store.set_offline(true);
    let err = api::history(&service, "north", "240001").await.unwrap_err();
    assert_eq!(err.code, 30);

    let health = api::health(&service);
    assert!(health.ok);
    assert_eq!(health.queue.written, 1);
}
