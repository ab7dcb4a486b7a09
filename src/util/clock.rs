//! Wall-clock helpers.

use chrono::{Local, NaiveDateTime};

/// Whole seconds since the unix epoch, as stored in registration records.
#[must_use]
pub fn unix_seconds() -> i64 {
    Local::now().timestamp()
}

/// Current local wall-clock time.
#[must_use]
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Format a second count as `HH:MM:SS`. Negative input renders as zero.
#[must_use]
pub fn format_hms(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}
