//! Storage port consumed by the core.
//!
//! Backends (document store, relational, in-memory) implement
//! [`PersistencePort`]; the admission core only ever sees
//! `Arc<dyn PersistencePort>` selected once at startup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::model::{CourseRecord, RegistrationRecord};
use super::PersistenceError;

/// Abstract storage used for catalogs and the registration audit trail.
#[async_trait]
pub trait PersistencePort: Send + Sync + 'static {
    /// Load the ordered catalog stored under `table` for `school`.
    async fn load_courses(
        &self,
        school: &str,
        table: &str,
    ) -> Result<Vec<CourseRecord>, PersistenceError>;

    /// Append a registration record.
    async fn write_registration(
        &self,
        school: &str,
        record: &RegistrationRecord,
    ) -> Result<(), PersistenceError>;

    /// Remove the newest record matching `student` and `course`.
    async fn delete_most_recent_registration(
        &self,
        school: &str,
        student: &str,
        course: &str,
    ) -> Result<(), PersistenceError>;

    /// All records of `student`, newest first.
    async fn fetch_history(
        &self,
        school: &str,
        student: &str,
    ) -> Result<Vec<RegistrationRecord>, PersistenceError>;
}

/// A storage write produced by the admission path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AuditEntry {
    /// Persist a new registration.
    Write {
        /// Owning school.
        school: String,
        /// Record to append.
        record: RegistrationRecord,
    },
    /// Erase the newest registration of a student for a course.
    Delete {
        /// Owning school.
        school: String,
        /// Student identifier.
        student: String,
        /// Course name.
        course: String,
    },
}

impl AuditEntry {
    /// School the entry belongs to.
    #[must_use]
    pub fn school(&self) -> &str {
        match self {
            Self::Write { school, .. } | Self::Delete { school, .. } => school,
        }
    }

    /// Apply the entry against a backend.
    ///
    /// # Errors
    ///
    /// Whatever the backend reports.
    pub async fn apply(&self, port: &dyn PersistencePort) -> Result<(), PersistenceError> {
        match self {
            Self::Write { school, record } => port.write_registration(school, record).await,
            Self::Delete {
                school,
                student,
                course,
            } => {
                port.delete_most_recent_registration(school, student, course)
                    .await
            }
        }
    }
}
