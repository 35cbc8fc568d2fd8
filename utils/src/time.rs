//! Time formatting helpers.

/// Format a duration in seconds to a human-readable string.
///
/// Used for "try again in ..." messages on resend cooldowns.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_seconds_minutes_hours() {
        assert_eq!(format_duration(29), "29s");
        assert_eq!(format_duration(90), "1m 30s");
        assert_eq!(format_duration(3720), "1h 2m");
    }
}
