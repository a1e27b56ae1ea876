use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::{models::TimerEntity, timer_store::TimerStore},
    dto::{
        dashboard::{TimerDetail, TimerSummary},
        forms::{LevelForm, TimerForm},
    },
    error::ServiceError,
    state::{SharedState, timer::Timer, validation::validate_aggregate},
};

/// List the dashboard rows for every timer owned by `user_id`.
pub async fn list_timers(
    state: &SharedState,
    user_id: &str,
) -> Result<Vec<TimerSummary>, ServiceError> {
    let store = state.require_timer_store().await?;
    let timers = store
        .list_timers_by_owner(user_id.to_string())
        .await?
        .into_iter()
        .map(Timer::from)
        .collect::<Vec<_>>();
    debug!(user_id, count = timers.len(), "listed timers");
    Ok(timers.iter().map(TimerSummary::from).collect())
}

/// Create an empty timer for `user_id`.
pub async fn create_timer(
    state: &SharedState,
    user_id: &str,
    form: TimerForm,
) -> Result<TimerSummary, ServiceError> {
    let store = state.require_timer_store().await?;
    let timer = Timer::new(user_id, form.name());
    let timer = persist(&store, &timer).await?;
    info!(user_id, timer_id = %timer.id, "created timer");
    Ok(TimerSummary::from(&timer))
}

/// Timer page data, for the owner only.
pub async fn timer_detail(
    state: &SharedState,
    user_id: &str,
    timer_id: Uuid,
) -> Result<TimerDetail, ServiceError> {
    let (_, timer) = load_owned(state, user_id, timer_id).await?;
    Ok(TimerDetail::from(&timer))
}

/// Delete a timer; deleting one that is already gone succeeds.
pub async fn delete_timer(
    state: &SharedState,
    user_id: &str,
    timer_id: Uuid,
) -> Result<(), ServiceError> {
    let (store, timer) = load_owned(state, user_id, timer_id).await?;
    if store.delete_timer(timer.id).await? {
        info!(user_id, %timer_id, "deleted timer");
    } else {
        debug!(user_id, %timer_id, "timer already gone");
    }
    Ok(())
}

/// Append a level described by `form` to the end of the timer.
pub async fn add_level(
    state: &SharedState,
    user_id: &str,
    timer_id: Uuid,
    form: LevelForm,
) -> Result<TimerDetail, ServiceError> {
    let parsed = form.parse()?;
    let (store, mut timer) = load_owned(state, user_id, timer_id).await?;
    let level_id = timer.append_level(parsed.kind, parsed.content).id;
    timer.clamp_cursor();
    let timer = persist(&store, &timer).await?;
    info!(user_id, %timer_id, %level_id, kind = %parsed.kind, "added level");
    Ok(TimerDetail::from(&timer))
}

/// Replace a level's amounts and duration; its kind is kept.
pub async fn edit_level(
    state: &SharedState,
    user_id: &str,
    timer_id: Uuid,
    level_id: Uuid,
    form: LevelForm,
) -> Result<TimerDetail, ServiceError> {
    let (store, mut timer) = load_owned(state, user_id, timer_id).await?;
    let kind = timer
        .find_level(level_id)
        .map(|level| level.kind)
        .ok_or_else(|| ServiceError::NotFound("level not found".into()))?;
    let content = form.parse_content(kind)?;
    timer.replace_level(level_id, content)?;
    let timer = persist(&store, &timer).await?;
    info!(user_id, %timer_id, %level_id, "edited level");
    Ok(TimerDetail::from(&timer))
}

/// Remove a level; removing an unknown level succeeds without saving.
pub async fn delete_level(
    state: &SharedState,
    user_id: &str,
    timer_id: Uuid,
    level_id: Uuid,
) -> Result<TimerDetail, ServiceError> {
    let (store, mut timer) = load_owned(state, user_id, timer_id).await?;
    if timer.remove_level(level_id).is_none() {
        debug!(user_id, %timer_id, %level_id, "level already removed");
        return Ok(TimerDetail::from(&timer));
    }
    let timer = persist(&store, &timer).await?;
    info!(user_id, %timer_id, %level_id, "removed level");
    Ok(TimerDetail::from(&timer))
}

/// Load a timer and check that `user_id` owns it.
pub(crate) async fn load_owned(
    state: &SharedState,
    user_id: &str,
    timer_id: Uuid,
) -> Result<(Arc<dyn TimerStore>, Timer), ServiceError> {
    let store = state.require_timer_store().await?;
    let entity = store
        .find_timer(timer_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("timer not found".into()))?;
    let timer = Timer::from(entity);
    if !timer.is_owned_by(user_id) {
        warn!(user_id, %timer_id, "timer is not owned by the authenticated user");
        return Err(ServiceError::Forbidden(
            "timer belongs to another user".into(),
        ));
    }
    Ok((store, timer))
}

/// Validate and save the whole aggregate, returning it with the stored timestamps.
pub(crate) async fn persist(
    store: &Arc<dyn TimerStore>,
    timer: &Timer,
) -> Result<Timer, ServiceError> {
    validate_aggregate(timer)?;
    let stored = store.save_timer(TimerEntity::from(timer)).await?;
    Ok(Timer::from(stored))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::memory_state;

    fn named(name: &str) -> TimerForm {
        TimerForm { name: name.into() }
    }

    fn level_form(kind: &str, small: &str, big: &str, minutes: &str) -> LevelForm {
        LevelForm {
            kind: Some(kind.into()),
            small_blind: Some(small.into()),
            big_blind: Some(big.into()),
            ante: None,
            duration_minutes: Some(minutes.into()),
        }
    }

    #[tokio::test]
    async fn create_and_list_only_shows_own_timers() {
        let state = memory_state().await;
        create_timer(&state, "alice", named("Friday")).await.unwrap();
        create_timer(&state, "bob", named("Saturday")).await.unwrap();

        let timers = list_timers(&state, "alice").await.unwrap();
        assert_eq!(timers.len(), 1);
        assert_eq!(timers[0].name, "Friday");
        assert_eq!(timers[0].level_count, 0);
    }

    #[tokio::test]
    async fn short_names_are_rejected_before_saving() {
        let state = memory_state().await;
        let err = create_timer(&state, "alice", named("ab")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(list_timers(&state, "alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn levels_can_be_added_edited_and_removed() {
        let state = memory_state().await;
        let timer = create_timer(&state, "alice", named("Friday")).await.unwrap();

        add_level(&state, "alice", timer.id, level_form("blind", "5", "10", "10"))
            .await
            .unwrap();
        let detail = add_level(&state, "alice", timer.id, level_form("break", "", "", "5"))
            .await
            .unwrap();
        assert_eq!(detail.levels.len(), 2);
        assert_eq!(detail.total_duration, "15:00");

        let blind_id = detail.levels[0].id;
        let detail = edit_level(
            &state,
            "alice",
            timer.id,
            blind_id,
            level_form("break", "25", "50", "20"),
        )
        .await
        .unwrap();
        assert_eq!(detail.levels[0].kind, "blind");
        assert_eq!(detail.levels[0].big_blind, 50);
        assert_eq!(detail.levels[0].display_duration, "20:00");

        let detail = delete_level(&state, "alice", timer.id, blind_id).await.unwrap();
        assert_eq!(detail.levels.len(), 1);
        let again = delete_level(&state, "alice", timer.id, blind_id).await.unwrap();
        assert_eq!(again.levels.len(), 1);
    }

    #[tokio::test]
    async fn appending_to_a_finished_timer_resumes_playback() {
        use crate::services::play_service::{Step, step};

        let state = memory_state().await;
        let timer = create_timer(&state, "alice", named("Friday")).await.unwrap();
        add_level(&state, "alice", timer.id, level_form("blind", "5", "10", "10"))
            .await
            .unwrap();
        let finished = step(&state, "alice", timer.id, Step::Next).await.unwrap();
        assert!(finished.is_complete);

        let detail = add_level(&state, "alice", timer.id, level_form("blind", "10", "20", "10"))
            .await
            .unwrap();
        assert_eq!(detail.current_position, Some(1));
        assert!(!detail.is_complete);

        let masthead = crate::services::play_service::current_masthead(&state, "alice", timer.id)
            .await
            .unwrap();
        assert!(!masthead.is_complete);
        assert!(masthead.controls.next);
        assert!(!masthead.controls.reset);
    }

    #[tokio::test]
    async fn inverted_blinds_are_not_saved() {
        let state = memory_state().await;
        let timer = create_timer(&state, "alice", named("Friday")).await.unwrap();

        let err = add_level(&state, "alice", timer.id, level_form("blind", "10", "5", "10"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let detail = timer_detail(&state, "alice", timer.id).await.unwrap();
        assert!(detail.levels.is_empty());
    }

    #[tokio::test]
    async fn editing_an_unknown_level_is_not_found() {
        let state = memory_state().await;
        let timer = create_timer(&state, "alice", named("Friday")).await.unwrap();
        let err = edit_level(
            &state,
            "alice",
            timer.id,
            Uuid::new_v4(),
            level_form("blind", "5", "10", "10"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn other_users_cannot_touch_a_timer() {
        let state = memory_state().await;
        let timer = create_timer(&state, "alice", named("Friday")).await.unwrap();

        assert!(matches!(
            timer_detail(&state, "mallory", timer.id).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            delete_timer(&state, "mallory", timer.id).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(timer_detail(&state, "alice", timer.id).await.is_ok());
    }

    #[tokio::test]
    async fn deleted_timers_are_gone() {
        let state = memory_state().await;
        let timer = create_timer(&state, "alice", named("Friday")).await.unwrap();
        delete_timer(&state, "alice", timer.id).await.unwrap();

        assert!(matches!(
            timer_detail(&state, "alice", timer.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn degraded_storage_fails_every_operation() {
        let state = memory_state().await;
        state.update_degraded(true);
        assert!(matches!(
            list_timers(&state, "alice").await,
            Err(ServiceError::Degraded)
        ));
    }
}
