use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Persisted discriminator of a level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LevelKindEntity {
    /// Blind-amount stage.
    Blind,
    /// Rest stage.
    Break,
}

/// One level embedded in a persisted timer record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelEntity {
    /// Stable identifier of the level, never reused.
    pub id: Uuid,
    /// Blind or break.
    pub kind: LevelKindEntity,
    /// Back-reference to the owning timer.
    pub timer_id: Uuid,
    /// Small blind amount (zero for breaks).
    pub small_blind: u64,
    /// Big blind amount (zero for breaks).
    pub big_blind: u64,
    /// Ante amount (zero for breaks).
    pub ante: u64,
    /// Duration in minutes, the source of truth.
    pub duration_minutes: u32,
    /// Derived duration in seconds, rewritten on every save and ignored on load.
    pub duration_seconds: i64,
}

/// Aggregate timer record persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimerEntity {
    /// Primary key of the timer.
    pub id: Uuid,
    /// Identifier of the user allowed to mutate the timer (secondary lookup key).
    pub owner_id: String,
    /// Display name.
    pub name: String,
    /// Ordered levels, embedded in the timer record.
    pub levels: Vec<LevelEntity>,
    /// Zero-based playback cursor.
    pub current_level: usize,
    /// Whether playback advanced past the final level.
    pub is_complete: bool,
    /// Set by the store on the first save.
    pub created_at: SystemTime,
    /// Set by the store on every save.
    pub updated_at: SystemTime,
}

impl TimerEntity {
    /// Apply the save-time timestamps: `created_at` is kept from the previous
    /// record when there is one, `updated_at` always moves to `now`.
    pub fn stamped(mut self, previous: Option<&TimerEntity>, now: SystemTime) -> Self {
        self.created_at = previous.map(|existing| existing.created_at).unwrap_or(now);
        self.updated_at = now;
        self
    }
}
