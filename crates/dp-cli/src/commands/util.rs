//! Shared utilities for CLI commands.

use dp_core::Minutes;

/// Formats minutes as `Xh Ym` from one hour up, `Xm` below.
pub fn format_minutes(minutes: Minutes) -> String {
    let total = minutes.get();
    let hours = total / 60;
    let minutes = total % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
