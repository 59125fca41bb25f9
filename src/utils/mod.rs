use std::time::Duration;

/// Short human-readable duration, e.g. `4.2s` or `3m 07s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    // Decide on the rounded value so 59.96s does not print as "60.0s"
    let tenths = (elapsed.as_secs_f64() * 10.0).round() as u64;
    if tenths < 600 {
        return format!("{}.{}s", tenths / 10, tenths % 10);
    }

    let secs = elapsed.as_secs_f64().round() as u64;
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}h {minutes:02}m {seconds:02}s")
    } else {
        format!("{minutes}m {seconds:02}s")
    }
}
