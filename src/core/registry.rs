//! Process-wide name -> school registry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::model::School;
use super::SignupError;

/// Lazily populated map of schools.
///
/// Lookups take the read lock; a miss retakes the write lock and checks again
/// so concurrent first lookups of one name always share a single [`School`].
#[derive(Debug, Default)]
pub struct SchoolRegistry {
    schools: RwLock<HashMap<String, Arc<School>>>,
}

impl SchoolRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the school named `name`, creating it on first use.
    ///
    /// # Errors
    ///
    /// `SignupError::UnknownSchool` for an empty name.
    pub fn get_or_create(&self, name: &str) -> Result<Arc<School>, SignupError> {
        if name.is_empty() {
            return Err(SignupError::UnknownSchool);
        }

        if let Some(school) = self.schools.read().get(name) {
            return Ok(Arc::clone(school));
        }

        let mut schools = self.schools.write();
        // Another caller may have won the race between the two locks.
        let school = schools
            .entry(name.to_owned())
            .or_insert_with(|| {
                tracing::debug!(school = %name, "creating school");
                Arc::new(School::new(name))
            });
        Ok(Arc::clone(school))
    }

    /// Lookup without creating.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<School>> {
        self.schools.read().get(name).cloned()
    }

    /// Number of known schools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schools.read().len()
    }

    /// True when no school has been looked up yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schools.read().is_empty()
    }
}
