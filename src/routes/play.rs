use axum::{
    Extension, Router,
    extract::{Path, Query, State},
    http::header::CONTENT_TYPE,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    dto::play::MastheadView,
    error::AppError,
    routes::{identity::CurrentUser, page_or_error, render_page},
    services::play_service::{self, PlayPage, Step},
    state::SharedState,
};

/// Event the play page listens to before starting the next countdown.
pub const PROCEED_EVENT: &str = "countdown::proceed";
/// Event the play page listens to before rearming a stopped countdown.
pub const RESET_EVENT: &str = "countdown::reset";

const TRIGGER_HEADER: &str = "HX-Trigger-After-Settle";

#[derive(Serialize)]
struct PlayContext {
    user: Option<String>,
    masthead: MastheadView,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProceedQuery {
    #[serde(default)]
    proceed: Option<String>,
}

impl ProceedQuery {
    /// Accepts the usual boolean spellings; anything else reads as false.
    fn proceed(&self) -> bool {
        matches!(
            self.proceed.as_deref().map(str::trim),
            Some("1" | "t" | "T" | "true" | "TRUE" | "True")
        )
    }
}

/// Playback pages; requires an authenticated user.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/play/{id}", get(play))
        .route("/play/{id}/levels/next", post(next_level))
        .route("/play/{id}/levels/previous", post(previous_level))
        .route("/play/{id}/levels/reset", post(reset_levels))
        .route(
            "/play/{id}/levels/{level_id}/audio/{action}",
            get(level_audio),
        )
}

async fn play(
    State(state): State<SharedState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Response {
    let page = play_page(&state, &user, id).await;
    page_or_error(&state, Some(&user.id), page)
}

async fn play_page(state: &SharedState, user: &CurrentUser, id: Uuid) -> Result<Response, AppError> {
    match play_service::play(state, &user.id, id).await? {
        PlayPage::Ready(masthead) => {
            let page = render_page(
                state,
                "play.html",
                &PlayContext {
                    user: Some(user.id.clone()),
                    masthead,
                    error: None,
                },
            )?;
            Ok(page.into_response())
        }
        PlayPage::NoLevels { timer_id } => {
            Ok(Redirect::temporary(&format!("/dashboard/timers/{timer_id}")).into_response())
        }
    }
}

async fn next_level(
    State(state): State<SharedState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Query(query): Query<ProceedQuery>,
) -> Result<impl IntoResponse, AppError> {
    let trigger = if query.proceed() {
        PROCEED_EVENT
    } else {
        RESET_EVENT
    };
    step(&state, user, id, Step::Next, trigger).await
}

async fn previous_level(
    State(state): State<SharedState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    step(&state, user, id, Step::Previous, RESET_EVENT).await
}

async fn reset_levels(
    State(state): State<SharedState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    step(&state, user, id, Step::Reset, RESET_EVENT).await
}

/// Apply `step` and answer with the masthead partial plus the countdown event.
async fn step(
    state: &SharedState,
    user: CurrentUser,
    id: Uuid,
    step: Step,
    trigger: &'static str,
) -> Result<([(&'static str, &'static str); 1], Html<String>), AppError> {
    let masthead = play_service::step(state, &user.id, id, step).await?;
    let partial = render_page(
        state,
        "partials/masthead.html",
        &PlayContext {
            user: Some(user.id),
            masthead,
            error: None,
        },
    )?;
    Ok(([(TRIGGER_HEADER, trigger)], partial))
}

async fn level_audio(
    State(state): State<SharedState>,
    Extension(user): Extension<CurrentUser>,
    Path((id, level_id, action)): Path<(Uuid, Uuid, String)>,
) -> Result<impl IntoResponse, AppError> {
    let clip = play_service::level_audio(&state, &user.id, id, level_id, &action).await?;
    Ok(([(CONTENT_TYPE, clip.content_type)], clip.bytes))
}
