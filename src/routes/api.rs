use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        dashboard::{TimerDetail, TimerSummary},
        play::MastheadView,
    },
    error::AppError,
    routes::identity::CurrentUser,
    services::{play_service, timer_service},
    state::SharedState,
};

/// Read-only JSON views; requires an authenticated user.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/timers", get(list_timers))
        .route("/api/timers/{id}", get(get_timer))
        .route("/api/play/{id}/masthead", get(get_masthead))
}

#[utoipa::path(
    get,
    path = "/api/timers",
    tag = "timers",
    responses(
        (status = 200, description = "Timers owned by the caller", body = [TimerSummary]),
        (status = 401, description = "No authenticated user"),
        (status = 503, description = "Storage unavailable")
    )
)]
/// List the caller's timers, oldest first.
pub async fn list_timers(
    State(state): State<SharedState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<TimerSummary>>, AppError> {
    Ok(Json(timer_service::list_timers(&state, &user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/timers/{id}",
    tag = "timers",
    params(("id" = Uuid, Path, description = "Timer identifier")),
    responses(
        (status = 200, description = "Timer with its levels", body = TimerDetail),
        (status = 403, description = "Timer belongs to another user"),
        (status = 404, description = "Timer not found")
    )
)]
/// Fetch one timer with its levels.
pub async fn get_timer(
    State(state): State<SharedState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<TimerDetail>, AppError> {
    Ok(Json(timer_service::timer_detail(&state, &user.id, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/play/{id}/masthead",
    tag = "play",
    params(("id" = Uuid, Path, description = "Timer identifier")),
    responses(
        (status = 200, description = "Current and upcoming level", body = MastheadView),
        (status = 403, description = "Timer belongs to another user"),
        (status = 404, description = "Timer not found or without levels")
    )
)]
/// Playback state of a timer as shown by the masthead.
pub async fn get_masthead(
    State(state): State<SharedState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MastheadView>, AppError> {
    Ok(Json(play_service::current_masthead(&state, &user.id, id).await?))
}
