//! Admission control, window scheduling and the audit write path.

pub mod admission;
pub mod error;
pub mod grade;
pub mod model;
pub mod persistence;
pub mod queue;
pub mod registry;
pub mod scheduler;

pub use admission::AdmissionController;
pub use error::{AppResult, ErrorKind, PersistenceError, SignupError};
pub use grade::grade_of;
pub use model::{
    CourseRecord, CourseSlot, CourseView, RegistrationRecord, School, SchoolState, SchoolStatus,
};
pub use persistence::{AuditEntry, PersistencePort};
pub use queue::{PersistenceQueue, QueueStats};
pub use registry::SchoolRegistry;
pub use scheduler::{
    seconds_until, EventId, EventPhase, OpenEvent, Scheduler, Spawn, TimerSnapshot,
};
