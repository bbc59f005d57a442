//! Internal status channel
//!
//! Failures inside the logging path cannot be logged through the logger
//! itself, so they are reported on stderr with a bracketed prefix.

use std::fmt::Display;

pub(crate) fn report_error(component: &str, message: impl Display) {
    eprintln!("[GELF ERROR] {}: {}", component, message);
}

pub(crate) fn report_warning(component: &str, message: impl Display) {
    eprintln!("[GELF WARNING] {}: {}", component, message);
}

/// True for the first occurrence and every 1000th one after it.
///
/// `previous` is the counter value before the current occurrence.
pub(crate) fn should_alert(previous: u64) -> bool {
    previous == 0 || (previous + 1).is_multiple_of(1000)
}
