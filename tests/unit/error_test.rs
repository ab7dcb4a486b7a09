//! Tests for error types

use course_signup::core::{ErrorKind, PersistenceError, SignupError};

#[test]
fn test_codes_are_stable() {
    assert_eq!(SignupError::UnknownSchool.code(), 1);
    assert_eq!(SignupError::MissingField("student").code(), 2);
    assert_eq!(SignupError::NotStarted.code(), 10);
    assert_eq!(SignupError::Full.code(), 13);
    assert_eq!(SignupError::NotRegistered.code(), 15);
    assert_eq!(SignupError::PastTime.code(), 21);
    assert_eq!(SignupError::QueueClosed.code(), 31);
}

#[test]
fn test_kinds() {
    assert_eq!(SignupError::BadFormat("x".into()).kind(), ErrorKind::Validation);
    assert_eq!(SignupError::Full.kind(), ErrorKind::State);
    assert_eq!(
        SignupError::CourseNotFound("chess".into()).kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        SignupError::TooCloseToExisting {
            category: "clubs".into(),
            delta_secs: 10
        }
        .kind(),
        ErrorKind::Configuration
    );
    assert_eq!(SignupError::QueueClosed.kind(), ErrorKind::TransientPersistence);
}

#[test]
fn test_error_display() {
    let err = SignupError::AlreadyRegisteredElsewhere {
        course: "chess".into(),
    };
    assert_eq!(err.to_string(), "already registered for chess");

    let err = SignupError::TooCloseToExisting {
        category: "clubs".into(),
        delta_secs: 900,
    };
    assert_eq!(err.to_string(), "too close to timer `clubs` (900s apart)");
}

#[test]
fn test_persistence_error_converts() {
    let err: SignupError = PersistenceError::Unavailable("db down".into()).into();
    assert_eq!(err.code(), 30);
    assert_eq!(err.kind(), ErrorKind::TransientPersistence);
    assert_eq!(err.to_string(), "storage unavailable: db down");
}
