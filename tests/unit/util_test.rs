//! Tests for utility functions

use chrono::Timelike;
use course_signup::util::{format_hms, local_now, unix_seconds};

#[test]
fn test_format_hms() {
    assert_eq!(format_hms(5400), "01:30:00");
    assert_eq!(format_hms(1795), "00:29:55");
}

#[test]
fn test_clocks_agree() {
    let before = chrono::Utc::now().timestamp();
    let secs = unix_seconds();
    assert!((secs - before).abs() <= 1);
    assert!(local_now().hour() < 24);
}
