//! Error types for admission, scheduling and persistence.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of every failure the core can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input or missing fields.
    Validation,
    /// The request conflicts with the current registration state.
    State,
    /// Unknown school, course or timer.
    NotFound,
    /// Storage failed; never surfaced from the admission path.
    TransientPersistence,
    /// Timers scheduled too close together.
    Configuration,
}

/// Failures reported by a [`crate::core::PersistencePort`] backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    /// The requested table or record does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The backend could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// Backend-specific failure with context.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Errors returned by the admission controller and the scheduler.
///
/// Admission-path errors are side-effect free: when one is returned no
/// in-memory state changed and nothing was queued for storage.
#[derive(Debug, Error)]
pub enum SignupError {
    /// Empty or unusable school name.
    #[error("unknown school")]
    UnknownSchool,
    /// A required request field was empty.
    #[error("missing field: {0}")]
    MissingField(&'static str),
    /// Registration window is not open.
    #[error("registration has not started")]
    NotStarted,
    /// The student already holds a seat in another course of this school.
    #[error("already registered for {course}")]
    AlreadyRegisteredElsewhere {
        /// Course currently held by the student.
        course: String,
    },
    /// No course with that name in the loaded catalog.
    #[error("course not found: {0}")]
    CourseNotFound(String),
    /// Every seat of the course is taken.
    #[error("course is full")]
    Full,
    /// Duplicate submission for the same course.
    #[error("already registered for this course")]
    AlreadyRegisteredHere,
    /// Cancel for a seat the student does not hold.
    #[error("not registered for this course")]
    NotRegistered,
    /// Wall-clock input was not `HH:MM` or the second count was not positive.
    #[error("bad time format: {0}")]
    BadFormat(String),
    /// Requested opening time is not in the future.
    #[error("opening time must be later than now")]
    PastTime,
    /// Another window on the same school opens too close to this one.
    #[error("too close to timer `{category}` ({delta_secs}s apart)")]
    TooCloseToExisting {
        /// Category of the conflicting timer.
        category: String,
        /// Absolute distance in seconds between the two openings.
        delta_secs: i64,
    },
    /// No pending timer for that category.
    #[error("no timer for category `{0}`")]
    TimerNotFound(String),
    /// Storage failure on a synchronous read path.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    /// The persistence queue has been shut down.
    #[error("persistence queue closed")]
    QueueClosed,
}

impl SignupError {
    /// Taxonomy bucket of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField(_) | Self::BadFormat(_) | Self::PastTime => ErrorKind::Validation,
            Self::NotStarted
            | Self::AlreadyRegisteredElsewhere { .. }
            | Self::Full
            | Self::AlreadyRegisteredHere
            | Self::NotRegistered => ErrorKind::State,
            Self::UnknownSchool | Self::CourseNotFound(_) | Self::TimerNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::Persistence(_) | Self::QueueClosed => ErrorKind::TransientPersistence,
            Self::TooCloseToExisting { .. } => ErrorKind::Configuration,
        }
    }

    /// Stable wire code. `0` is reserved for success.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::UnknownSchool => 1,
            Self::MissingField(_) => 2,
            Self::NotStarted => 10,
            Self::AlreadyRegisteredElsewhere { .. } => 11,
            Self::CourseNotFound(_) => 12,
            Self::Full => 13,
            Self::AlreadyRegisteredHere => 14,
            Self::NotRegistered => 15,
            Self::BadFormat(_) => 20,
            Self::PastTime => 21,
            Self::TooCloseToExisting { .. } => 22,
            Self::TimerNotFound(_) => 23,
            Self::Persistence(_) => 30,
            Self::QueueClosed => 31,
        }
    }
}

/// Application-facing result using anyhow for startup wiring.
pub type AppResult<T> = Result<T, anyhow::Error>;
