//! View-models consumed by the play page and its masthead partial.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{dto::duration::format_countdown, state::timer::Level};

/// One level as displayed to players and operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LevelView {
    /// Level identifier, stable across edits.
    pub id: Uuid,
    /// `blind` or `break`.
    pub kind: String,
    /// One-based position in the timer.
    pub position: usize,
    /// Small blind, zero for breaks.
    pub small_blind: u64,
    /// Big blind, zero for breaks.
    pub big_blind: u64,
    /// Ante, zero for breaks.
    pub ante: u64,
    /// Configured length in minutes.
    pub duration_minutes: u32,
    /// Length in seconds, used by the countdown script.
    pub duration_seconds: i64,
    /// `MM:SS` or `HH:MM:SS`.
    pub display_duration: String,
}

impl LevelView {
    /// Project the level found at zero-based `index`.
    pub fn new(level: &Level, index: usize) -> Self {
        Self {
            id: level.id,
            kind: level.kind.as_str().to_string(),
            position: index + 1,
            small_blind: level.small_blind,
            big_blind: level.big_blind,
            ante: level.ante,
            duration_minutes: level.duration_minutes,
            duration_seconds: level.duration_seconds(),
            display_duration: format_countdown(level.duration_seconds()),
        }
    }
}

/// Which playback buttons are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Controls {
    /// Enabled unless the first level is playing.
    pub previous: bool,
    /// Enabled unless the last level is playing.
    pub next: bool,
    /// Enabled once the timer is complete.
    pub reset: bool,
}

/// Audio clip announcing the current level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CueRef {
    /// `play` or `continue`.
    pub action: String,
    /// Audio URL, versioned by the spoken content.
    pub url: String,
}

/// Everything the masthead shows during play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MastheadView {
    /// Owning timer.
    pub timer_id: Uuid,
    /// Display name of the timer.
    pub timer_name: String,
    /// Number of levels in the timer.
    pub level_count: usize,
    /// Playback ran past the last level.
    pub is_complete: bool,
    /// Level under the cursor.
    pub current: LevelView,
    /// Following level, absent on the last one.
    pub next: Option<LevelView>,
    /// Which buttons are enabled.
    pub controls: Controls,
    /// One cue per announcement kind.
    pub cues: Vec<CueRef>,
}
