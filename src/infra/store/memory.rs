//! In-memory storage backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::core::{CourseRecord, PersistenceError, PersistencePort, RegistrationRecord};

/// Catalogs and registration records held in process memory.
///
/// Intended for development and tests. `set_offline(true)` makes every call
/// fail with `Unavailable`, which is how outages are simulated.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    catalogs: RwLock<HashMap<(String, String), Vec<CourseRecord>>>,
    registrations: Mutex<HashMap<String, Vec<RegistrationRecord>>>,
    offline: AtomicBool,
}

impl InMemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style catalog seeding.
    #[must_use]
    pub fn with_catalog(self, school: &str, table: &str, courses: Vec<CourseRecord>) -> Self {
        self.put_catalog(school, table, courses);
        self
    }

    /// Store or replace the catalog `table` of `school`.
    pub fn put_catalog(&self, school: &str, table: &str, courses: Vec<CourseRecord>) {
        self.catalogs
            .write()
            .insert((school.to_owned(), table.to_owned()), courses);
    }

    /// Stored registrations of `school` in insertion order.
    #[must_use]
    pub fn registrations(&self, school: &str) -> Vec<RegistrationRecord> {
        self.registrations
            .lock()
            .get(school)
            .cloned()
            .unwrap_or_default()
    }

    /// Toggle simulated outage.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Release);
    }

    fn check_online(&self) -> Result<(), PersistenceError> {
        if self.offline.load(Ordering::Acquire) {
            return Err(PersistenceError::Unavailable("in-memory store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PersistencePort for InMemoryStore {
    async fn load_courses(
        &self,
        school: &str,
        table: &str,
    ) -> Result<Vec<CourseRecord>, PersistenceError> {
        self.check_online()?;
        self.catalogs
            .read()
            .get(&(school.to_owned(), table.to_owned()))
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound(format!("{school}/{table}")))
    }

    async fn write_registration(
        &self,
        school: &str,
        record: &RegistrationRecord,
    ) -> Result<(), PersistenceError> {
        self.check_online()?;
        self.registrations
            .lock()
            .entry(school.to_owned())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    async fn delete_most_recent_registration(
        &self,
        school: &str,
        student: &str,
        course: &str,
    ) -> Result<(), PersistenceError> {
        self.check_online()?;
        let mut registrations = self.registrations.lock();
        let records = registrations.get_mut(school);
        // Newest timestamp wins; among equal timestamps the later insert wins.
        let newest = records.as_ref().and_then(|records| {
            records
                .iter()
                .enumerate()
                .filter(|(_, r)| r.student == student && r.course == course)
                .max_by_key(|(idx, r)| (r.timestamp, *idx))
                .map(|(idx, _)| idx)
        });
        match (records, newest) {
            (Some(records), Some(idx)) => {
                records.remove(idx);
                Ok(())
            }
            _ => Err(PersistenceError::NotFound(format!(
                "{school}/{student}/{course}"
            ))),
        }
    }

    async fn fetch_history(
        &self,
        school: &str,
        student: &str,
    ) -> Result<Vec<RegistrationRecord>, PersistenceError> {
        self.check_online()?;
        let registrations = self.registrations.lock();
        let mut history: Vec<(usize, &RegistrationRecord)> = registrations
            .get(school)
            .map(|records| {
                records
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| r.student == student)
                    .collect()
            })
            .unwrap_or_default();
        history.sort_by(|(ia, a), (ib, b)| (b.timestamp, ib).cmp(&(a.timestamp, ia)));
        Ok(history.into_iter().map(|(_, r)| r.clone()).collect())
    }
}
