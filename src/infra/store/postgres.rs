//! Relational storage adapter (schema and interface stubs).

use async_trait::async_trait;

use crate::core::{CourseRecord, PersistenceError, PersistencePort, RegistrationRecord};

const NOT_WIRED: &str = "postgres store not wired to database client";

/// Relational backend placeholder. Carries the schema the catalog and audit
/// trail live in; every call fails until a client is wired in.
#[derive(Debug, Clone, Default)]
pub struct PostgresStore;

impl PostgresStore {
    /// Create the adapter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Migration statements for catalogs and the registration audit trail.
    #[must_use]
    pub fn migrations() -> &'static [&'static str] {
        &[
            r"
CREATE TABLE IF NOT EXISTS signup_courses (
    school TEXT NOT NULL,
    catalog TEXT NOT NULL,
    position INT NOT NULL,
    name TEXT NOT NULL,
    teacher TEXT NOT NULL,
    total_seats INT NOT NULL CHECK (total_seats >= 0),
    grades SMALLINT[] NOT NULL,
    PRIMARY KEY (school, catalog, name)
);
CREATE INDEX IF NOT EXISTS idx_signup_courses_order ON signup_courses (school, catalog, position);
",
            r"
CREATE TABLE IF NOT EXISTS signup_registrations (
    id BIGSERIAL PRIMARY KEY,
    school TEXT NOT NULL,
    student TEXT NOT NULL,
    course TEXT NOT NULL,
    teacher TEXT NOT NULL,
    timestamp BIGINT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_signup_registrations_student
    ON signup_registrations (school, student, timestamp DESC);
",
        ]
    }
}

#[async_trait]
impl PersistencePort for PostgresStore {
    async fn load_courses(
        &self,
        _school: &str,
        _table: &str,
    ) -> Result<Vec<CourseRecord>, PersistenceError> {
        Err(PersistenceError::Backend(NOT_WIRED.into()))
    }

    async fn write_registration(
        &self,
        _school: &str,
        _record: &RegistrationRecord,
    ) -> Result<(), PersistenceError> {
        Err(PersistenceError::Backend(NOT_WIRED.into()))
    }

    async fn delete_most_recent_registration(
        &self,
        _school: &str,
        _student: &str,
        _course: &str,
    ) -> Result<(), PersistenceError> {
        Err(PersistenceError::Backend(NOT_WIRED.into()))
    }

    async fn fetch_history(
        &self,
        _school: &str,
        _student: &str,
    ) -> Result<Vec<RegistrationRecord>, PersistenceError> {
        Err(PersistenceError::Backend(NOT_WIRED.into()))
    }
}
