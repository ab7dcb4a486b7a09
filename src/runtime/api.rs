//! API-facing request/response models.
//!
//! The HTTP layer decodes requests into these types, calls the functions
//! below and serializes whatever comes back. Mutations answer with a
//! [`Reply`] carrying a stable `code` (`0` on success); reads answer with a
//! typed body or a [`Reply`] describing the failure.

use serde::{Deserialize, Serialize};

use crate::builders::SignupService;
use crate::core::{
    CourseView, QueueStats, RegistrationRecord, SignupError, SchoolStatus, TimerSnapshot,
};

/// Outcome of a mutating call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// `0` on success, otherwise [`SignupError::code`].
    pub code: u16,
    /// Human readable outcome.
    pub message: String,
}

impl Reply {
    /// Success reply.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            code: 0,
            message: message.into(),
        }
    }

    /// Whether this reply reports success.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code == 0
    }

    fn from_result(result: Result<(), SignupError>, success: &str) -> Self {
        result.map_or_else(|e| Self::from(&e), |()| Self::ok(success))
    }
}

impl From<&SignupError> for Reply {
    fn from(err: &SignupError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl From<SignupError> for Reply {
    fn from(err: SignupError) -> Self {
        Self::from(&err)
    }
}

/// Register or cancel payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// School name.
    pub school: String,
    /// Student id.
    pub student: String,
    /// Course name.
    pub course: String,
}

/// Cancel carries the same fields as register.
pub type CancelRequest = RegisterRequest;

/// Timer payload: either a wall-clock `at` (`HH:MM`) or a raw `seconds` count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetTimerRequest {
    /// School name.
    pub school: String,
    /// Category opened by this timer.
    pub category: String,
    /// Catalog table preloaded for it.
    pub table: String,
    /// Opening time today.
    #[serde(default)]
    pub at: Option<String>,
    /// Opening delay in seconds.
    #[serde(default)]
    pub seconds: Option<i64>,
}

/// Eligible course listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseListResponse {
    /// Courses in catalog order.
    pub data: Vec<CourseView>,
}

/// Window state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// `started` or `notStarted`.
    pub status: String,
    /// Open category.
    pub course_tag: String,
}

impl From<SchoolStatus> for StatusResponse {
    fn from(status: SchoolStatus) -> Self {
        Self {
            status: if status.started { "started" } else { "notStarted" }.to_owned(),
            course_tag: status.course_tag,
        }
    }
}

/// Course currently held by a student (empty when none).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationInfoResponse {
    /// Course name or empty string.
    pub course: String,
}

/// Stored registrations, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Records.
    pub data: Vec<RegistrationRecord>,
}

/// Live timers of a school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimersResponse {
    /// Timers, soonest first.
    pub timers: Vec<TimerSnapshot>,
}

/// Liveness payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
    /// Audit queue counters.
    pub queue: QueueStats,
    /// Live timers across all schools.
    pub pending_timers: usize,
}

/// Claim a seat.
pub fn register(service: &SignupService, req: &RegisterRequest) -> Reply {
    Reply::from_result(
        service
            .admission
            .register(&req.school, &req.student, &req.course),
        "registered",
    )
}

/// Give a seat back.
pub fn cancel(service: &SignupService, req: &CancelRequest) -> Reply {
    Reply::from_result(
        service
            .admission
            .cancel(&req.school, &req.student, &req.course),
        "cancelled",
    )
}

/// Courses the student may enroll in.
///
/// # Errors
///
/// Failure reply.
pub fn list_courses(
    service: &SignupService,
    school: &str,
    student: &str,
) -> Result<CourseListResponse, Reply> {
    let data = service.admission.list_eligible_courses(school, student)?;
    Ok(CourseListResponse { data })
}

/// Window state.
///
/// # Errors
///
/// Failure reply.
pub fn status(service: &SignupService, school: &str) -> Result<StatusResponse, Reply> {
    Ok(service.admission.status(school)?.into())
}

/// Course currently held by a student.
///
/// # Errors
///
/// Failure reply.
pub fn registration_info(
    service: &SignupService,
    school: &str,
    student: &str,
) -> Result<RegistrationInfoResponse, Reply> {
    let course = service
        .admission
        .registration_info(school, student)?
        .unwrap_or_default();
    Ok(RegistrationInfoResponse { course })
}

/// Stored registration history.
///
/// # Errors
///
/// Failure reply.
pub async fn history(
    service: &SignupService,
    school: &str,
    student: &str,
) -> Result<HistoryResponse, Reply> {
    let data = service.admission.history(school, student).await?;
    Ok(HistoryResponse { data })
}

/// Create or reschedule a timer.
pub fn set_timer(service: &SignupService, req: &SetTimerRequest) -> Reply {
    let scheduler = &service.scheduler;
    let result = match (&req.at, req.seconds) {
        (Some(at), _) => scheduler.set_timer(&req.school, &req.category, &req.table, at),
        (None, Some(seconds)) => {
            scheduler.set_timer_in(&req.school, &req.category, &req.table, seconds)
        }
        (None, None) => Err(SignupError::MissingField("at")),
    };
    Reply::from_result(result.map(|_| ()), "timer set")
}

/// Drop a pending timer.
pub fn remove_timer(service: &SignupService, school: &str, category: &str) -> Reply {
    Reply::from_result(
        service.scheduler.remove_timer(school, category),
        "timer removed",
    )
}

/// Live timers of a school.
///
/// # Errors
///
/// Failure reply.
pub fn get_timers(service: &SignupService, school: &str) -> Result<TimersResponse, Reply> {
    let timers = service.scheduler.get_timers(school)?;
    Ok(TimersResponse { timers })
}

/// Liveness and backlog.
#[must_use]
pub fn health(service: &SignupService) -> Health {
    Health {
        ok: true,
        queue: service.queue.stats(),
        pending_timers: service.scheduler.pending(),
    }
}
