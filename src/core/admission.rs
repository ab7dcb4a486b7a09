//! Seat admission: register, cancel and eligibility listings.
//!
//! Every mutating decision runs under the school's exclusive lock: the window
//! check, the single-enrollment scan, the capacity check, the audit enqueue
//! and the seat change happen as one step. A rejected request leaves no trace
//! in memory or in the persistence queue.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::debug;

use super::grade::grade_of;
use super::model::{CourseView, RegistrationRecord, School, SchoolStatus};
use super::persistence::{AuditEntry, PersistencePort};
use super::queue::PersistenceQueue;
use super::registry::SchoolRegistry;
use super::SignupError;
use crate::util::clock::unix_seconds;

/// Entry point for student-facing operations.
#[derive(Clone)]
pub struct AdmissionController {
    registry: Arc<SchoolRegistry>,
    queue: Arc<PersistenceQueue>,
    port: Arc<dyn PersistencePort>,
}

fn require(value: &str, field: &'static str) -> Result<(), SignupError> {
    if value.is_empty() {
        return Err(SignupError::MissingField(field));
    }
    Ok(())
}

impl AdmissionController {
    /// Wire a controller over shared state.
    pub fn new(
        registry: Arc<SchoolRegistry>,
        queue: Arc<PersistenceQueue>,
        port: Arc<dyn PersistencePort>,
    ) -> Self {
        Self {
            registry,
            queue,
            port,
        }
    }

    /// Registry backing this controller.
    #[must_use]
    pub const fn registry(&self) -> &Arc<SchoolRegistry> {
        &self.registry
    }

    fn school(&self, name: &str) -> Result<Arc<School>, SignupError> {
        self.registry.get_or_create(name)
    }

    /// Claim a seat in `course` for `student`.
    ///
    /// # Errors
    ///
    /// In evaluation order: `NotStarted`, `AlreadyRegisteredElsewhere`,
    /// `CourseNotFound`, `Full`, `AlreadyRegisteredHere`; `QueueClosed` if the
    /// audit entry could not be buffered (the seat is then not taken).
    pub fn register(&self, school: &str, student: &str, course: &str) -> Result<(), SignupError> {
        let school = self.school(school)?;
        require(student, "student")?;
        require(course, "course")?;

        let mut state = school.write();
        if !state.started() {
            return Err(SignupError::NotStarted);
        }
        if let Some(held) = state
            .courses()
            .iter()
            .find(|slot| slot.name() != course && slot.holds(student))
        {
            return Err(SignupError::AlreadyRegisteredElsewhere {
                course: held.name().to_owned(),
            });
        }
        let slot = state
            .find_mut(course)
            .ok_or_else(|| SignupError::CourseNotFound(course.to_owned()))?;
        if slot.is_full() {
            return Err(SignupError::Full);
        }
        if slot.holds(student) {
            return Err(SignupError::AlreadyRegisteredHere);
        }

        self.queue.enqueue(AuditEntry::Write {
            school: school.name().to_owned(),
            record: RegistrationRecord {
                student: student.to_owned(),
                course: course.to_owned(),
                teacher: slot.teacher().to_owned(),
                timestamp: unix_seconds(),
            },
        })?;
        slot.seat(student);

        debug!(
            school = %school.name(),
            student,
            course,
            enrolled = slot.enrolled_count(),
            total = slot.total_seats(),
            "seat registered"
        );
        Ok(())
    }

    /// Give back a seat. Allowed whether or not the window is open.
    ///
    /// # Errors
    ///
    /// `NotRegistered` when the student holds no seat in `course`.
    pub fn cancel(&self, school: &str, student: &str, course: &str) -> Result<(), SignupError> {
        let school = self.school(school)?;
        require(student, "student")?;
        require(course, "course")?;

        let mut state = school.write();
        let slot = match state.find_mut(course) {
            Some(slot) if slot.holds(student) => slot,
            _ => return Err(SignupError::NotRegistered),
        };

        self.queue.enqueue(AuditEntry::Delete {
            school: school.name().to_owned(),
            student: student.to_owned(),
            course: course.to_owned(),
        })?;
        slot.release(student);

        debug!(
            school = %school.name(),
            student,
            course,
            enrolled = slot.enrolled_count(),
            "seat cancelled"
        );
        Ok(())
    }

    /// Courses whose eligible grades include the student's current grade.
    ///
    /// # Errors
    ///
    /// `UnknownSchool` or `MissingField`.
    pub fn list_eligible_courses(
        &self,
        school: &str,
        student: &str,
    ) -> Result<Vec<CourseView>, SignupError> {
        self.list_eligible_courses_on(school, student, Local::now().date_naive())
    }

    /// [`Self::list_eligible_courses`] evaluated on a given calendar day.
    ///
    /// # Errors
    ///
    /// `UnknownSchool` or `MissingField`.
    pub fn list_eligible_courses_on(
        &self,
        school: &str,
        student: &str,
        today: NaiveDate,
    ) -> Result<Vec<CourseView>, SignupError> {
        let school = self.school(school)?;
        require(student, "student")?;

        let Some(grade) = grade_of(student, &today) else {
            return Ok(Vec::new());
        };
        let state = school.read();
        Ok(state
            .courses()
            .iter()
            .filter(|slot| slot.admits_grade(grade))
            .map(|slot| slot.view())
            .collect())
    }

    /// Window state of a school.
    ///
    /// # Errors
    ///
    /// `UnknownSchool` for an empty name.
    pub fn status(&self, school: &str) -> Result<SchoolStatus, SignupError> {
        Ok(self.school(school)?.status())
    }

    /// Course the student currently holds, if any.
    ///
    /// # Errors
    ///
    /// `UnknownSchool` or `MissingField`.
    pub fn registration_info(
        &self,
        school: &str,
        student: &str,
    ) -> Result<Option<String>, SignupError> {
        let school = self.school(school)?;
        require(student, "student")?;
        let state = school.read();
        Ok(state.held_by(student).map(|slot| slot.name().to_owned()))
    }

    /// Stored registration history, newest first.
    ///
    /// Reads go straight to storage; entries still buffered in the queue are
    /// not visible yet.
    ///
    /// # Errors
    ///
    /// `UnknownSchool`, `MissingField` or a backend failure.
    pub async fn history(
        &self,
        school: &str,
        student: &str,
    ) -> Result<Vec<RegistrationRecord>, SignupError> {
        let school = self.school(school)?;
        require(student, "student")?;
        Ok(self.port.fetch_history(school.name(), student).await?)
    }
}
