//! Countdown strings shown next to every level.

/// Clock components of a countdown, with the hour column shown only when non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownParts {
    /// Hours, wrapped at a day.
    pub hours: i64,
    /// Minutes within the hour.
    pub minutes: i64,
    /// Seconds within the minute.
    pub seconds: i64,
}

impl CountdownParts {
    /// Whether the `HH:` column is displayed.
    pub fn show_hours(&self) -> bool {
        self.hours > 0
    }
}

/// Split a second count into clock components. Negative input counts as zero and
/// hours wrap at a day.
pub fn split_countdown(total_seconds: i64) -> CountdownParts {
    let total = total_seconds.max(0);
    CountdownParts {
        hours: (total / 3600) % 24,
        minutes: (total / 60) % 60,
        seconds: total % 60,
    }
}

/// Format a second count as `MM:SS`, or `HH:MM:SS` once it spans an hour.
pub fn format_countdown(total_seconds: i64) -> String {
    let parts = split_countdown(total_seconds);
    if parts.show_hours() {
        format!(
            "{:02}:{:02}:{:02}",
            parts.hours, parts.minutes, parts.seconds
        )
    } else {
        format!("{:02}:{:02}", parts.minutes, parts.seconds)
    }
}
