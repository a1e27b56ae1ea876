//! Cursor and level-sequence mutations on a [`Timer`].
//!
//! Every operation leaves the timer satisfying its invariants: the cursor
//! stays inside the level list and completion is a flag on the last level,
//! never an out-of-range cursor. Callers persist the timer afterwards.

use thiserror::Error;
use uuid::Uuid;

use crate::state::timer::{Level, LevelContent, LevelKind, Timer};

/// Failures raised by the sequencer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// Playback was driven on a timer without levels.
    #[error("timer `{timer_id}` has no levels")]
    EmptyTimer { timer_id: Uuid },
    /// The referenced level is not part of the timer.
    #[error("level `{level_id}` not found in timer `{timer_id}`")]
    LevelNotFound { timer_id: Uuid, level_id: Uuid },
}

impl Timer {
    /// Move to the next level, or flag completion when already on the last one.
    pub fn advance(&mut self) -> Result<&Level, SequenceError> {
        let last = self.last_index()?;
        if self.current_level >= last {
            self.current_level = last;
            self.is_complete = true;
        } else {
            self.current_level += 1;
            self.is_complete = false;
        }
        self.current_or_empty()
    }

    /// Move to the previous level; on the first level only the completion flag is cleared.
    pub fn retreat(&mut self) -> Result<&Level, SequenceError> {
        self.last_index()?;
        self.current_level = self.current_level.saturating_sub(1);
        self.is_complete = false;
        self.current_or_empty()
    }

    /// Restart the current level without moving the cursor.
    pub fn reset(&mut self) -> Result<&Level, SequenceError> {
        self.last_index()?;
        self.is_complete = false;
        self.current_or_empty()
    }

    /// Append a new level with a fresh identifier.
    pub fn append_level(&mut self, kind: LevelKind, content: LevelContent) -> &Level {
        let mut level = Level {
            id: Uuid::new_v4(),
            kind,
            timer_id: self.id,
            small_blind: 0,
            big_blind: 0,
            ante: 0,
            duration_minutes: 0,
        };
        level.apply(content);
        let index = self.levels.len();
        self.levels.push(level);
        &self.levels[index]
    }

    /// Overwrite a level's amounts and duration, keeping its id, kind and owner.
    pub fn replace_level(
        &mut self,
        level_id: Uuid,
        content: LevelContent,
    ) -> Result<&Level, SequenceError> {
        let timer_id = self.id;
        let level = self
            .levels
            .iter_mut()
            .find(|level| level.id == level_id)
            .ok_or(SequenceError::LevelNotFound { timer_id, level_id })?;
        level.apply(content);
        Ok(&*level)
    }

    /// Remove a level if present, keeping the order of the others.
    ///
    /// The cursor is not shifted when an earlier level goes away; it is only
    /// clamped to the new bounds.
    pub fn remove_level(&mut self, level_id: Uuid) -> Option<Level> {
        let index = self.levels.iter().position(|level| level.id == level_id)?;
        let removed = self.levels.remove(index);
        self.clamp_cursor();
        Some(removed)
    }

    fn last_index(&self) -> Result<usize, SequenceError> {
        self.levels
            .len()
            .checked_sub(1)
            .ok_or(SequenceError::EmptyTimer { timer_id: self.id })
    }

    fn current_or_empty(&self) -> Result<&Level, SequenceError> {
        self.current()
            .ok_or(SequenceError::EmptyTimer { timer_id: self.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blinds(small: u64, big: u64, minutes: u32) -> LevelContent {
        LevelContent {
            small_blind: small,
            big_blind: big,
            ante: 0,
            duration_minutes: minutes,
        }
    }

    fn timer_with(levels: usize) -> Timer {
        let mut timer = Timer::new("alice", "Sunday");
        for i in 0..levels as u64 {
            timer.append_level(LevelKind::Blind, blinds(5 * (i + 1), 10 * (i + 1), 10));
        }
        timer
    }

    #[test]
    fn append_leaves_playback_alone_until_the_cursor_is_clamped() {
        let mut timer = timer_with(1);
        timer.advance().unwrap();
        assert_eq!(timer.position(), (0, true));

        timer.append_level(LevelKind::Break, LevelContent::rest(5));
        assert_eq!(timer.position(), (0, true));

        timer.clamp_cursor();
        assert_eq!(timer.position(), (0, false));
    }

    #[test]
    fn scripted_tournament_walkthrough() {
        let mut timer = Timer::new("alice", "Home game");
        timer.append_level(LevelKind::Blind, blinds(5, 10, 10));
        timer.append_level(LevelKind::Break, LevelContent::rest(5));
        timer.append_level(LevelKind::Blind, blinds(10, 20, 10));

        assert_eq!(timer.advance().unwrap().kind, LevelKind::Break);
        assert_eq!(timer.position(), (1, false));

        assert_eq!(timer.advance().unwrap().big_blind, 20);
        assert_eq!(timer.position(), (2, false));

        timer.advance().unwrap();
        assert_eq!(timer.position(), (2, true));

        timer.reset().unwrap();
        assert_eq!(timer.position(), (2, false));

        assert_eq!(timer.retreat().unwrap().kind, LevelKind::Break);
        assert_eq!(timer.position(), (1, false));
    }

    #[test]
    fn advancing_from_any_cursor_reaches_completion_and_stays_there() {
        for len in 1..6 {
            for start in 0..len {
                let mut timer = timer_with(len);
                timer.current_level = start;

                for _ in 0..(len - 1 - start) {
                    timer.advance().unwrap();
                }
                timer.advance().unwrap();
                assert_eq!(timer.position(), (len - 1, true), "len {len} start {start}");

                let before = timer.clone();
                timer.advance().unwrap();
                assert_eq!(timer, before);
            }
        }
    }

    #[test]
    fn retreat_on_first_level_only_clears_completion() {
        let mut timer = timer_with(1);
        timer.advance().unwrap();
        assert!(timer.is_complete);

        timer.retreat().unwrap();
        assert_eq!(timer.position(), (0, false));

        let mut timer = timer_with(3);
        timer.retreat().unwrap();
        assert_eq!(timer.position(), (0, false));
    }

    #[test]
    fn playback_on_an_empty_timer_is_an_error() {
        let mut timer = timer_with(0);
        let expected = SequenceError::EmptyTimer { timer_id: timer.id };
        assert_eq!(timer.advance().unwrap_err(), expected);
        assert_eq!(timer.retreat().unwrap_err(), expected);
        assert_eq!(timer.reset().unwrap_err(), expected);
    }

    #[test]
    fn append_does_not_touch_playback_state() {
        let mut timer = timer_with(2);
        timer.advance().unwrap();
        timer.advance().unwrap();

        let level = timer.append_level(LevelKind::Break, LevelContent::rest(15)).clone();
        assert_eq!(level.timer_id, timer.id);
        assert_eq!(level.duration_seconds(), 900);
        assert_eq!(timer.position(), (1, true));
    }

    #[test]
    fn replace_keeps_identity_and_kind() {
        let mut timer = timer_with(2);
        let original = timer.levels[1].clone();

        let updated = timer
            .replace_level(original.id, blinds(50, 100, 20))
            .unwrap()
            .clone();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.kind, original.kind);
        assert_eq!(updated.timer_id, timer.id);
        assert_eq!((updated.small_blind, updated.big_blind), (50, 100));
        assert_eq!(updated.duration_seconds(), 1200);
    }

    #[test]
    fn replacing_an_unknown_level_is_not_found() {
        let mut timer = timer_with(1);
        let missing = Uuid::new_v4();
        assert_eq!(
            timer.replace_level(missing, blinds(1, 2, 3)).unwrap_err(),
            SequenceError::LevelNotFound {
                timer_id: timer.id,
                level_id: missing
            }
        );
    }

    #[test]
    fn removal_is_idempotent_and_order_preserving() {
        let mut timer = timer_with(4);
        let ids = timer.levels.iter().map(|l| l.id).collect::<Vec<_>>();

        assert!(timer.remove_level(ids[1]).is_some());
        assert!(timer.remove_level(ids[1]).is_none());
        assert!(timer.remove_level(Uuid::new_v4()).is_none());

        let remaining = timer.levels.iter().map(|l| l.id).collect::<Vec<_>>();
        assert_eq!(remaining, vec![ids[0], ids[2], ids[3]]);
    }

    #[test]
    fn removal_clamps_the_cursor_without_shifting_it() {
        let mut timer = timer_with(3);
        timer.current_level = 2;
        timer.is_complete = true;

        let first = timer.levels[0].id;
        timer.remove_level(first);
        assert_eq!(timer.position(), (1, true));

        let last = timer.levels[1].id;
        timer.remove_level(last);
        assert_eq!(timer.current_level, 0);

        let only = timer.levels[0].id;
        timer.remove_level(only);
        assert_eq!(timer.position(), (0, false));
        assert!(timer.current().is_none());
    }

    #[test]
    fn removal_before_the_cursor_keeps_its_index() {
        let mut timer = timer_with(4);
        timer.current_level = 2;
        let playing = timer.levels[2].id;
        let first = timer.levels[0].id;

        timer.remove_level(first);
        assert_eq!(timer.current_level, 2);
        assert_ne!(timer.current().unwrap().id, playing);
    }

    #[test]
    fn ids_are_never_reused_after_removal() {
        let mut timer = timer_with(1);
        let removed = timer.levels[0].clone();
        timer.remove_level(removed.id);

        let again = timer.append_level(removed.kind, removed.content()).clone();
        assert_ne!(again.id, removed.id);
        assert_eq!(again.content(), removed.content());
    }
}
