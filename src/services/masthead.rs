//! Builds the masthead view-model from a timer and its current level.

use crate::{
    dto::play::{Controls, CueRef, LevelView, MastheadView},
    services::{
        audio::VoiceProfile,
        cues::{CueAction, cue_url},
    },
    state::{sequencer::SequenceError, timer::Timer},
};

/// Compose the masthead for the level under the cursor.
pub fn compose(timer: &Timer, voice: &VoiceProfile) -> Result<MastheadView, SequenceError> {
    let current = timer
        .current()
        .ok_or(SequenceError::EmptyTimer { timer_id: timer.id })?;
    let last = timer.levels.len() - 1;

    let cues = CueAction::ALL
        .into_iter()
        .map(|action| CueRef {
            action: action.as_str().to_string(),
            url: cue_url(timer.id, current, action, voice),
        })
        .collect();

    Ok(MastheadView {
        timer_id: timer.id,
        timer_name: timer.name.clone(),
        level_count: timer.levels.len(),
        is_complete: timer.is_complete,
        current: LevelView::new(current, timer.current_level),
        next: timer
            .upcoming()
            .map(|level| LevelView::new(level, timer.current_level + 1)),
        controls: Controls {
            previous: timer.current_level > 0,
            next: timer.current_level < last,
            reset: timer.is_complete,
        },
        cues,
    })
}
