//! In-memory seat ledger: schools, course slots and the records they emit.
//!
//! Each [`School`] owns exactly one reader-writer lock over its
//! [`SchoolState`]. Registration, cancellation, catalog swaps and the open
//! transition take the write side; status and listings take the read side.

use std::collections::HashSet;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};

/// One catalog row as delivered by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    /// Course name, unique within a catalog.
    pub name: String,
    /// Teacher running the course.
    pub teacher: String,
    /// Seat cap.
    pub total_seats: u32,
    /// Grade numbers allowed to enroll.
    pub grades: Vec<u8>,
}

impl CourseRecord {
    /// Convenience constructor.
    pub fn new(
        name: impl Into<String>,
        teacher: impl Into<String>,
        total_seats: u32,
        grades: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            teacher: teacher.into(),
            total_seats,
            grades: grades.into(),
        }
    }
}

/// Append-only audit entity written on every successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    /// Student identifier.
    pub student: String,
    /// Course name.
    pub course: String,
    /// Teacher of the course at registration time.
    pub teacher: String,
    /// Unix seconds.
    pub timestamp: i64,
}

/// Read-only projection of a slot handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseView {
    /// Course name.
    pub name: String,
    /// Teacher.
    pub teacher: String,
    /// Seat cap.
    pub total: u32,
    /// Seats taken.
    pub enrolled: u32,
    /// Eligible grades.
    pub grades: Vec<u8>,
}

/// Window state of a school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolStatus {
    /// Whether registration is open.
    pub started: bool,
    /// Category of the catalog currently open (empty before the first opening).
    pub course_tag: String,
}

/// One course offering with a fixed seat cap.
///
/// The enrolled count is the size of the student set, so the count and the
/// membership can never drift apart.
#[derive(Debug, Clone)]
pub struct CourseSlot {
    name: String,
    teacher: String,
    total_seats: u32,
    grades: Vec<u8>,
    enrolled: HashSet<String>,
}

impl CourseSlot {
    /// Build an empty slot from a catalog row.
    #[must_use]
    pub fn new(record: CourseRecord) -> Self {
        Self {
            name: record.name,
            teacher: record.teacher,
            total_seats: record.total_seats,
            grades: record.grades,
            enrolled: HashSet::new(),
        }
    }

    /// Course name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Teacher name.
    #[must_use]
    pub fn teacher(&self) -> &str {
        &self.teacher
    }

    /// Seat cap.
    #[must_use]
    pub const fn total_seats(&self) -> u32 {
        self.total_seats
    }

    /// Seats currently taken.
    #[must_use]
    pub fn enrolled_count(&self) -> u32 {
        u32::try_from(self.enrolled.len()).unwrap_or(u32::MAX)
    }

    /// True when every seat is taken.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.enrolled_count() >= self.total_seats
    }

    /// Whether `student` holds a seat here.
    #[must_use]
    pub fn holds(&self, student: &str) -> bool {
        self.enrolled.contains(student)
    }

    /// Whether students of `grade` may enroll.
    #[must_use]
    pub fn admits_grade(&self, grade: u8) -> bool {
        self.grades.contains(&grade)
    }

    pub(crate) fn seat(&mut self, student: &str) -> bool {
        self.enrolled.insert(student.to_owned())
    }

    pub(crate) fn release(&mut self, student: &str) -> bool {
        self.enrolled.remove(student)
    }

    /// Snapshot for listings.
    #[must_use]
    pub fn view(&self) -> CourseView {
        CourseView {
            name: self.name.clone(),
            teacher: self.teacher.clone(),
            total: self.total_seats,
            enrolled: self.enrolled_count(),
            grades: self.grades.clone(),
        }
    }
}

/// State guarded by a school's lock.
#[derive(Debug, Default)]
pub struct SchoolState {
    courses: Vec<CourseSlot>,
    started: bool,
    course_tag: String,
}

impl SchoolState {
    /// Ordered slot collection.
    #[must_use]
    pub fn courses(&self) -> &[CourseSlot] {
        &self.courses
    }

    /// Whether registration is open.
    #[must_use]
    pub const fn started(&self) -> bool {
        self.started
    }

    /// Open category label.
    #[must_use]
    pub fn course_tag(&self) -> &str {
        &self.course_tag
    }

    /// Slot by course name.
    #[must_use]
    pub fn find(&self, course: &str) -> Option<&CourseSlot> {
        self.courses.iter().find(|slot| slot.name == course)
    }

    pub(crate) fn find_mut(&mut self, course: &str) -> Option<&mut CourseSlot> {
        self.courses.iter_mut().find(|slot| slot.name == course)
    }

    /// The slot in which `student` holds a seat, if any.
    #[must_use]
    pub fn held_by(&self, student: &str) -> Option<&CourseSlot> {
        self.courses.iter().find(|slot| slot.holds(student))
    }
}

/// A tenant owning its own catalog and registration window.
#[derive(Debug)]
pub struct School {
    name: String,
    state: RwLock<SchoolState>,
}

impl School {
    /// Create a school with an empty catalog and a closed window.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: RwLock::new(SchoolState::default()),
        }
    }

    /// Registry key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared access for status and listings.
    pub fn read(&self) -> RwLockReadGuard<'_, SchoolState> {
        self.state.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, SchoolState> {
        self.state.write()
    }

    /// Current window state.
    #[must_use]
    pub fn status(&self) -> SchoolStatus {
        let state = self.read();
        SchoolStatus {
            started: state.started,
            course_tag: state.course_tag.clone(),
        }
    }

    /// Whether registration is open.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.read().started
    }

    /// Snapshot of every slot in catalog order.
    #[must_use]
    pub fn course_views(&self) -> Vec<CourseView> {
        self.read().courses.iter().map(CourseSlot::view).collect()
    }

    /// Swap in a fresh catalog wholesale.
    ///
    /// All counts restart at zero and the window closes until the owning
    /// event opens it again.
    pub fn replace_catalog(&self, records: Vec<CourseRecord>) {
        let courses: Vec<CourseSlot> = records.into_iter().map(CourseSlot::new).collect();
        let mut state = self.write();
        state.courses = courses;
        state.started = false;
    }

    /// Open the window for `course_tag`.
    pub fn open(&self, course_tag: &str) {
        let mut state = self.write();
        state.started = true;
        course_tag.clone_into(&mut state.course_tag);
    }
}
