use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dto::play::MastheadView,
    error::ServiceError,
    services::{
        audio::AudioClip,
        cues::{CueAction, cue_text},
        masthead,
        timer_service::{load_owned, persist},
    },
    state::SharedState,
};

/// Playback transition requested from the masthead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Move to the following level, or finish on the last one.
    Next,
    /// Move back one level.
    Previous,
    /// Restart the current level.
    Reset,
}

impl Step {
    /// Name used in URLs and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Next => "next",
            Step::Previous => "previous",
            Step::Reset => "reset",
        }
    }
}

/// What the play page shows for a timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayPage {
    /// Masthead of the level under the cursor.
    Ready(MastheadView),
    /// Nothing to play yet; the caller sends the user to the timer's dashboard page.
    NoLevels { timer_id: Uuid },
}

/// Masthead for the level under the cursor.
pub async fn play(
    state: &SharedState,
    user_id: &str,
    timer_id: Uuid,
) -> Result<PlayPage, ServiceError> {
    let (_, timer) = load_owned(state, user_id, timer_id).await?;
    if timer.levels.is_empty() {
        debug!(user_id, %timer_id, "timer has no levels to play");
        return Ok(PlayPage::NoLevels { timer_id });
    }
    Ok(PlayPage::Ready(masthead::compose(
        &timer,
        state.cues().voice(),
    )?))
}

/// Masthead for API clients; a timer without levels has none.
pub async fn current_masthead(
    state: &SharedState,
    user_id: &str,
    timer_id: Uuid,
) -> Result<MastheadView, ServiceError> {
    match play(state, user_id, timer_id).await? {
        PlayPage::Ready(view) => Ok(view),
        PlayPage::NoLevels { .. } => Err(ServiceError::NotFound("timer has no levels".into())),
    }
}

/// Move the cursor and return the refreshed masthead. The timer is saved only
/// when its playback position changed.
pub async fn step(
    state: &SharedState,
    user_id: &str,
    timer_id: Uuid,
    step: Step,
) -> Result<MastheadView, ServiceError> {
    let (store, mut timer) = load_owned(state, user_id, timer_id).await?;
    let before = timer.position();

    let moved = match step {
        Step::Next => timer.advance(),
        Step::Previous => timer.retreat(),
        Step::Reset => timer.reset(),
    };
    moved?;

    let (current_level, is_complete) = timer.position();
    if (current_level, is_complete) != before {
        timer = persist(&store, &timer).await?;
        info!(
            user_id,
            %timer_id,
            step = step.as_str(),
            current_level,
            is_complete,
            "moved playback cursor"
        );
    } else {
        debug!(user_id, %timer_id, step = step.as_str(), "playback position unchanged");
    }

    Ok(masthead::compose(&timer, state.cues().voice())?)
}

/// Audio announcing `level_id` for the cue `action` (`play` or `continue`).
pub async fn level_audio(
    state: &SharedState,
    user_id: &str,
    timer_id: Uuid,
    level_id: Uuid,
    action: &str,
) -> Result<AudioClip, ServiceError> {
    let action = action.parse::<CueAction>().map_err(ServiceError::InvalidInput)?;
    let (_, timer) = load_owned(state, user_id, timer_id).await?;
    let level = timer
        .find_level(level_id)
        .ok_or_else(|| ServiceError::NotFound("level not found".into()))?;

    let text = cue_text(level, action);
    debug!(user_id, %timer_id, %level_id, %action, %text, "resolving cue audio");
    Ok(state.cues().resolve(text).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::forms::{LevelForm, TimerForm},
        services::{test_support::memory_state, timer_service},
        state::timer::Timer,
    };

    async fn seeded(state: &SharedState) -> Uuid {
        let timer = timer_service::create_timer(
            state,
            "alice",
            TimerForm {
                name: "Home game".into(),
            },
        )
        .await
        .unwrap();
        for (kind, small, big, minutes) in [
            ("blind", "5", "10", "10"),
            ("break", "", "", "5"),
            ("blind", "10", "20", "10"),
        ] {
            timer_service::add_level(
                state,
                "alice",
                timer.id,
                LevelForm {
                    kind: Some(kind.into()),
                    small_blind: Some(small.into()),
                    big_blind: Some(big.into()),
                    ante: None,
                    duration_minutes: Some(minutes.into()),
                },
            )
            .await
            .unwrap();
        }
        timer.id
    }

    #[tokio::test]
    async fn steps_walk_the_tournament_and_persist() {
        let state = memory_state().await;
        let id = seeded(&state).await;

        let view = step(&state, "alice", id, Step::Next).await.unwrap();
        assert_eq!(view.current.kind, "break");
        let view = step(&state, "alice", id, Step::Next).await.unwrap();
        assert_eq!(view.current.position, 3);
        let view = step(&state, "alice", id, Step::Next).await.unwrap();
        assert!(view.is_complete);
        assert!(view.controls.reset);

        let view = step(&state, "alice", id, Step::Reset).await.unwrap();
        assert!(!view.is_complete);
        assert_eq!(view.current.position, 3);

        let view = step(&state, "alice", id, Step::Previous).await.unwrap();
        assert_eq!(view.current.position, 2);

        match play(&state, "alice", id).await.unwrap() {
            PlayPage::Ready(view) => assert_eq!(view.current.position, 2),
            other => panic!("unexpected page {other:?}"),
        }
    }

    #[tokio::test]
    async fn unchanged_position_is_not_saved() {
        let state = memory_state().await;
        let id = seeded(&state).await;
        let store = state.require_timer_store().await.unwrap();
        let before = store.find_timer(id).await.unwrap().unwrap().updated_at;

        step(&state, "alice", id, Step::Previous).await.unwrap();
        step(&state, "alice", id, Step::Reset).await.unwrap();

        let after = store.find_timer(id).await.unwrap().unwrap().updated_at;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn empty_timer_redirects_and_refuses_steps() {
        let state = memory_state().await;
        let timer = timer_service::create_timer(
            &state,
            "alice",
            TimerForm {
                name: "Empty".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(
            play(&state, "alice", timer.id).await.unwrap(),
            PlayPage::NoLevels { timer_id: timer.id }
        );
        assert!(matches!(
            step(&state, "alice", timer.id, Step::Next).await,
            Err(ServiceError::InvalidState(_))
        ));
        assert!(matches!(
            current_masthead(&state, "alice", timer.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn audio_is_resolved_from_the_cue_text() {
        let state = memory_state().await;
        let id = seeded(&state).await;
        let view = current_masthead(&state, "alice", id).await.unwrap();

        let clip = level_audio(&state, "alice", id, view.current.id, "continue")
            .await
            .unwrap();
        assert_eq!(
            String::from_utf8(clip.bytes).unwrap(),
            "Blinds Up. The blinds are now 5/10. This level will last for 10 minutes"
        );
    }

    #[tokio::test]
    async fn unknown_audio_actions_are_rejected() {
        let state = memory_state().await;
        let id = seeded(&state).await;
        let view = current_masthead(&state, "alice", id).await.unwrap();

        assert!(matches!(
            level_audio(&state, "alice", id, view.current.id, "rewind").await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            level_audio(&state, "alice", id, Uuid::new_v4(), "play").await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            level_audio(&state, "mallory", id, view.current.id, "play").await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_player_and_editor_lose_an_update() {
        let state = memory_state().await;
        let id = seeded(&state).await;
        let store = state.require_timer_store().await.unwrap();

        // Two requests load the same record before either saves.
        let mut player = Timer::from(store.find_timer(id).await.unwrap().unwrap());
        let mut editor = Timer::from(store.find_timer(id).await.unwrap().unwrap());

        player.advance().unwrap();
        persist(&store, &player).await.unwrap();

        editor.name = "Renamed".into();
        persist(&store, &editor).await.unwrap();

        let stored = Timer::from(store.find_timer(id).await.unwrap().unwrap());
        assert_eq!(stored.name, "Renamed");
        assert_eq!(stored.current_level, 0);
    }
}
