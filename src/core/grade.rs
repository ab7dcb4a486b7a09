//! Grade derivation from a student id.
//!
//! A student id starts with the two-digit enrollment year (`24...` for 2024).
//! The academic year rolls over in September.

use chrono::Datelike;

/// Highest grade offset (before the September bump) still considered enrolled.
const MAX_GRADE_OFFSET: i32 = 5;

/// Grade of `student` on `today`, or `None` when the id carries no usable
/// year or the student is outside the school's grade range.
///
/// A derived grade of zero is treated as ineligible.
#[must_use]
pub fn grade_of<D: Datelike>(student: &str, today: &D) -> Option<u8> {
    let year: i32 = student.get(0..2)?.parse().ok()?;
    let mut grade = today.year() - 2000 - year;
    if !(0..=MAX_GRADE_OFFSET).contains(&grade) {
        return None;
    }
    if today.month() >= 9 {
        grade += 1;
    }
    if grade == 0 {
        return None;
    }
    u8::try_from(grade).ok()
}
