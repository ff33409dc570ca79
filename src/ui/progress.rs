//! Duration formatting.

use std::time::Duration;

/// Format a duration for display.
///
/// Sub-second durations are shown in milliseconds, anything under a minute
/// in seconds with one decimal, and longer runs in minutes.
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        format!("{:.1}m", duration.as_secs_f64() / 60.0)
    }
}
