//! In-memory timer aggregate loaded for the duration of one request.

use std::{fmt, str::FromStr, time::SystemTime};

use uuid::Uuid;

use crate::dao::models::{LevelEntity, LevelKindEntity, TimerEntity};

/// Stage type of a level, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelKind {
    /// Stage with blind amounts.
    Blind,
    /// Rest stage.
    Break,
}

impl LevelKind {
    /// Lower-case tag used in forms, URLs and templates.
    pub fn as_str(self) -> &'static str {
        match self {
            LevelKind::Blind => "blind",
            LevelKind::Break => "break",
        }
    }
}

impl fmt::Display for LevelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a level kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLevelKind(pub String);

impl fmt::Display for UnknownLevelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown level kind `{}`", self.0)
    }
}

impl std::error::Error for UnknownLevelKind {}

impl FromStr for LevelKind {
    type Err = UnknownLevelKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "blind" => Ok(LevelKind::Blind),
            "break" => Ok(LevelKind::Break),
            _ => Err(UnknownLevelKind(value.to_string())),
        }
    }
}

/// Editable part of a level: everything except its identity and kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelContent {
    /// Small blind, zero for breaks.
    pub small_blind: u64,
    /// Big blind, zero for breaks.
    pub big_blind: u64,
    /// Ante, zero for breaks.
    pub ante: u64,
    /// Length in minutes, always positive once validated.
    pub duration_minutes: u32,
}

impl LevelContent {
    /// Content of a break, which carries no blind amounts.
    pub fn rest(duration_minutes: u32) -> Self {
        Self {
            duration_minutes,
            ..Self::default()
        }
    }
}

/// One stage of a tournament.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    /// Identifier.
    pub id: Uuid,
    /// Fixed when the level is created.
    pub kind: LevelKind,
    /// Owning timer.
    pub timer_id: Uuid,
    /// Small blind, zero for breaks.
    pub small_blind: u64,
    /// Big blind, zero for breaks.
    pub big_blind: u64,
    /// Ante, zero for breaks.
    pub ante: u64,
    /// Length in minutes, always positive once validated.
    pub duration_minutes: u32,
}

impl Level {
    /// Duration in seconds, always derived from the minutes.
    pub fn duration_seconds(&self) -> i64 {
        i64::from(self.duration_minutes) * 60
    }

    /// Current editable content of the level.
    pub fn content(&self) -> LevelContent {
        LevelContent {
            small_blind: self.small_blind,
            big_blind: self.big_blind,
            ante: self.ante,
            duration_minutes: self.duration_minutes,
        }
    }

    pub(crate) fn apply(&mut self, content: LevelContent) {
        self.small_blind = content.small_blind;
        self.big_blind = content.big_blind;
        self.ante = content.ante;
        self.duration_minutes = content.duration_minutes;
    }
}

/// Timer aggregate: ordered levels plus the playback cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    /// Identifier.
    pub id: Uuid,
    /// User allowed to see and change the timer.
    pub owner_id: String,
    /// Display name.
    pub name: String,
    /// Levels in playing order.
    pub levels: Vec<Level>,
    /// Zero-based cursor, inside `levels` whenever there are any.
    pub current_level: usize,
    /// Playback advanced past the last level.
    pub is_complete: bool,
    /// Set by the store on the first save.
    pub created_at: SystemTime,
    /// Set by the store on every save.
    pub updated_at: SystemTime,
}

impl Timer {
    /// Create an empty timer with a fresh identifier.
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = SystemTime::now();
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            name: name.into(),
            levels: Vec::new(),
            current_level: 0,
            is_complete: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Level under the cursor, `None` for an empty timer.
    pub fn current(&self) -> Option<&Level> {
        self.levels.get(self.current_level)
    }

    /// Level following the cursor, `None` when the cursor is on the last level.
    pub fn upcoming(&self) -> Option<&Level> {
        self.current()?;
        self.levels.get(self.current_level + 1)
    }

    /// Level with the given id, if any.
    pub fn find_level(&self, level_id: Uuid) -> Option<&Level> {
        self.levels.iter().find(|level| level.id == level_id)
    }

    /// Sum of every level's duration.
    pub fn total_duration_seconds(&self) -> i64 {
        self.levels.iter().map(Level::duration_seconds).sum()
    }

    /// Whether `user_id` owns the timer.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    /// Snapshot of the playback position, used to detect whether a request moved it.
    pub fn position(&self) -> (usize, bool) {
        (self.current_level, self.is_complete)
    }

    /// Bring the cursor back inside the level list. Completion only holds on
    /// the last level, so a flag left behind by appending or removing levels
    /// is dropped.
    pub(crate) fn clamp_cursor(&mut self) {
        match self.levels.len() {
            0 => {
                self.current_level = 0;
                self.is_complete = false;
            }
            len => {
                self.current_level = self.current_level.min(len - 1);
                if self.current_level != len - 1 {
                    self.is_complete = false;
                }
            }
        }
    }
}

impl From<LevelKindEntity> for LevelKind {
    fn from(kind: LevelKindEntity) -> Self {
        match kind {
            LevelKindEntity::Blind => LevelKind::Blind,
            LevelKindEntity::Break => LevelKind::Break,
        }
    }
}

impl From<LevelKind> for LevelKindEntity {
    fn from(kind: LevelKind) -> Self {
        match kind {
            LevelKind::Blind => LevelKindEntity::Blind,
            LevelKind::Break => LevelKindEntity::Break,
        }
    }
}

impl From<LevelEntity> for Level {
    fn from(entity: LevelEntity) -> Self {
        // duration_seconds is derived, the stored copy is ignored.
        Self {
            id: entity.id,
            kind: entity.kind.into(),
            timer_id: entity.timer_id,
            small_blind: entity.small_blind,
            big_blind: entity.big_blind,
            ante: entity.ante,
            duration_minutes: entity.duration_minutes,
        }
    }
}

impl From<&Level> for LevelEntity {
    fn from(level: &Level) -> Self {
        Self {
            id: level.id,
            kind: level.kind.into(),
            timer_id: level.timer_id,
            small_blind: level.small_blind,
            big_blind: level.big_blind,
            ante: level.ante,
            duration_minutes: level.duration_minutes,
            duration_seconds: level.duration_seconds(),
        }
    }
}

impl From<TimerEntity> for Timer {
    fn from(entity: TimerEntity) -> Self {
        let mut timer = Self {
            id: entity.id,
            owner_id: entity.owner_id,
            name: entity.name,
            levels: entity.levels.into_iter().map(Level::from).collect(),
            current_level: entity.current_level,
            is_complete: entity.is_complete,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        };
        timer.clamp_cursor();
        timer
    }
}

impl From<&Timer> for TimerEntity {
    fn from(timer: &Timer) -> Self {
        Self {
            id: timer.id,
            owner_id: timer.owner_id.clone(),
            name: timer.name.clone(),
            levels: timer.levels.iter().map(LevelEntity::from).collect(),
            current_level: timer.current_level,
            is_complete: timer.is_complete,
            created_at: timer.created_at,
            updated_at: timer.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blind(timer_id: Uuid, small: u64, big: u64, minutes: u32) -> Level {
        Level {
            id: Uuid::new_v4(),
            kind: LevelKind::Blind,
            timer_id,
            small_blind: small,
            big_blind: big,
            ante: 0,
            duration_minutes: minutes,
        }
    }

    #[test]
    fn level_kind_parses_case_insensitively() {
        assert_eq!("Blind".parse::<LevelKind>(), Ok(LevelKind::Blind));
        assert_eq!(" break ".parse::<LevelKind>(), Ok(LevelKind::Break));
        assert!("ante".parse::<LevelKind>().is_err());
    }

    #[test]
    fn stored_seconds_are_recomputed() {
        let timer_id = Uuid::new_v4();
        let mut entity = LevelEntity::from(&blind(timer_id, 5, 10, 15));
        assert_eq!(entity.duration_seconds, 900);

        entity.duration_seconds = 42;
        let level = Level::from(entity);
        assert_eq!(level.duration_seconds(), 900);
    }

    #[test]
    fn loading_clamps_an_out_of_range_cursor() {
        let mut timer = Timer::new("alice", "Friday");
        timer.levels.push(blind(timer.id, 5, 10, 10));
        timer.levels.push(blind(timer.id, 10, 20, 10));
        let mut entity = TimerEntity::from(&timer);
        entity.current_level = 7;

        let loaded = Timer::from(entity);
        assert_eq!(loaded.current_level, 1);

        let mut empty = TimerEntity::from(&Timer::new("alice", "Empty"));
        empty.current_level = 3;
        empty.is_complete = true;
        let loaded = Timer::from(empty);
        assert_eq!(loaded.position(), (0, false));
    }

    #[test]
    fn loading_drops_completion_away_from_the_last_level() {
        let mut timer = Timer::new("alice", "Friday");
        timer.levels.push(blind(timer.id, 5, 10, 10));
        timer.levels.push(blind(timer.id, 10, 20, 10));
        let mut entity = TimerEntity::from(&timer);
        entity.current_level = 0;
        entity.is_complete = true;
        assert_eq!(Timer::from(entity.clone()).position(), (0, false));

        entity.current_level = 1;
        assert_eq!(Timer::from(entity).position(), (1, true));
    }

    #[test]
    fn upcoming_level_is_none_on_the_last_level_and_for_empty_timers() {
        let mut timer = Timer::new("alice", "Friday");
        assert!(timer.upcoming().is_none());

        timer.levels.push(blind(timer.id, 5, 10, 10));
        timer.levels.push(blind(timer.id, 10, 20, 10));
        assert_eq!(timer.upcoming().map(|l| l.big_blind), Some(20));

        timer.current_level = 1;
        assert!(timer.upcoming().is_none());
        assert_eq!(timer.total_duration_seconds(), 1200);
    }
}
