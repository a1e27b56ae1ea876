use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Timer list and timer page view-models.
pub mod dashboard;
/// Countdown formatting.
pub mod duration;
/// HTML form parsing.
pub mod forms;
/// Health check payload.
pub mod health;
/// Play page view-models.
pub mod play;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
