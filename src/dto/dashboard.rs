//! Dashboard projections of a user's timers.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::{duration::format_countdown, format_system_time, play::LevelView},
    state::timer::Timer,
};

/// Row of the timers list.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimerSummary {
    /// Identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Number of levels in the timer.
    pub level_count: usize,
    /// Sum of all level durations, formatted like a countdown.
    pub total_duration: String,
    /// RFC 3339 timestamp of the last save.
    pub updated_at: String,
}

impl From<&Timer> for TimerSummary {
    fn from(timer: &Timer) -> Self {
        Self {
            id: timer.id,
            name: timer.name.clone(),
            level_count: timer.levels.len(),
            total_duration: format_countdown(timer.total_duration_seconds()),
            updated_at: format_system_time(timer.updated_at),
        }
    }
}

/// Full timer page: metadata, playback position and the level table.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimerDetail {
    /// Identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// One-based position of the level under the cursor, absent without levels.
    pub current_position: Option<usize>,
    /// Playback ran past the last level.
    pub is_complete: bool,
    /// Sum of all level durations, formatted like a countdown.
    pub total_duration: String,
    /// RFC 3339 timestamp of the first save.
    pub created_at: String,
    /// RFC 3339 timestamp of the last save.
    pub updated_at: String,
    /// Levels in playing order.
    pub levels: Vec<LevelView>,
}

impl From<&Timer> for TimerDetail {
    fn from(timer: &Timer) -> Self {
        Self {
            id: timer.id,
            name: timer.name.clone(),
            current_position: timer.current().map(|_| timer.current_level + 1),
            is_complete: timer.is_complete,
            total_duration: format_countdown(timer.total_duration_seconds()),
            created_at: format_system_time(timer.created_at),
            updated_at: format_system_time(timer.updated_at),
            levels: timer
                .levels
                .iter()
                .enumerate()
                .map(|(index, level)| LevelView::new(level, index))
                .collect(),
        }
    }
}
