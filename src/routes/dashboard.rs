use axum::{
    Extension, Form, Router,
    extract::{Path, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    dto::{
        dashboard::{TimerDetail, TimerSummary},
        forms::{LevelForm, TimerForm},
    },
    error::{AppError, ServiceError},
    routes::{
        identity::{CurrentUser, resolve_user},
        page_or_error, render_page,
    },
    services::timer_service,
    state::{SharedState, validation::public_message},
};

#[derive(Serialize)]
struct HomePage {
    user: Option<String>,
}

#[derive(Serialize)]
struct TimersPage {
    user: Option<String>,
    timers: Vec<TimerSummary>,
    error: Option<String>,
}

#[derive(Serialize)]
struct TimerPage {
    user: Option<String>,
    timer: TimerDetail,
    error: Option<String>,
}

/// Public landing page.
pub fn public_router() -> Router<SharedState> {
    Router::new().route("/", get(home))
}

/// Timer management pages; requires an authenticated user.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/dashboard/timers", get(list_timers).post(create_timer))
        .route(
            "/dashboard/timers/{id}",
            get(show_timer).delete(delete_timer),
        )
        .route("/dashboard/timers/{id}/levels", post(add_level))
        .route(
            "/dashboard/timers/{id}/levels/{level_id}",
            post(edit_level).delete(delete_level),
        )
}

async fn home(State(state): State<SharedState>, headers: HeaderMap) -> Result<Html<String>, AppError> {
    let user = resolve_user(state.config(), &headers).map(|user| user.id);
    render_page(&state, "home.html", &HomePage { user })
}

async fn list_timers(
    State(state): State<SharedState>,
    Extension(user): Extension<CurrentUser>,
) -> Response {
    let page = timers_page(&state, &user).await;
    page_or_error(&state, Some(&user.id), page)
}

async fn timers_page(state: &SharedState, user: &CurrentUser) -> Result<Html<String>, AppError> {
    let timers = timer_service::list_timers(state, &user.id).await?;
    render_page(
        state,
        "timers.html",
        &TimersPage {
            user: Some(user.id.clone()),
            timers,
            error: None,
        },
    )
}

/// Create a timer and answer with the refreshed list; validation failures are shown inline.
async fn create_timer(
    State(state): State<SharedState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<TimerForm>,
) -> Result<Html<String>, AppError> {
    let error = match timer_service::create_timer(&state, &user.id, form).await {
        Ok(_) => None,
        Err(ServiceError::Validation(errors)) => Some(public_message(&errors)),
        Err(err) => return Err(err.into()),
    };
    let timers = timer_service::list_timers(&state, &user.id).await?;
    render_page(
        &state,
        "partials/timers_list.html",
        &TimersPage {
            user: Some(user.id),
            timers,
            error,
        },
    )
}

async fn show_timer(
    State(state): State<SharedState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Response {
    let page = timer_page(&state, &user, id).await;
    page_or_error(&state, Some(&user.id), page)
}

async fn timer_page(
    state: &SharedState,
    user: &CurrentUser,
    id: Uuid,
) -> Result<Html<String>, AppError> {
    let timer = timer_service::timer_detail(state, &user.id, id).await?;
    render_page(
        state,
        "timer.html",
        &TimerPage {
            user: Some(user.id.clone()),
            timer,
            error: None,
        },
    )
}

/// Delete a timer and send the browser back to the list.
async fn delete_timer(
    State(state): State<SharedState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    timer_service::delete_timer(&state, &user.id, id).await?;
    Ok([("HX-Redirect", "/dashboard/timers")])
}

async fn add_level(
    State(state): State<SharedState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Form(form): Form<LevelForm>,
) -> Result<Html<String>, AppError> {
    let result = timer_service::add_level(&state, &user.id, id, form).await;
    levels_partial(&state, user, id, result).await
}

async fn edit_level(
    State(state): State<SharedState>,
    Extension(user): Extension<CurrentUser>,
    Path((id, level_id)): Path<(Uuid, Uuid)>,
    Form(form): Form<LevelForm>,
) -> Result<Html<String>, AppError> {
    let result = timer_service::edit_level(&state, &user.id, id, level_id, form).await;
    levels_partial(&state, user, id, result).await
}

async fn delete_level(
    State(state): State<SharedState>,
    Extension(user): Extension<CurrentUser>,
    Path((id, level_id)): Path<(Uuid, Uuid)>,
) -> Result<Html<String>, AppError> {
    let result = timer_service::delete_level(&state, &user.id, id, level_id).await;
    levels_partial(&state, user, id, result).await
}

/// Render the levels table after a mutation, reloading the unchanged timer when
/// the input was rejected so the message shows next to the current levels.
async fn levels_partial(
    state: &SharedState,
    user: CurrentUser,
    timer_id: Uuid,
    result: Result<TimerDetail, ServiceError>,
) -> Result<Html<String>, AppError> {
    let (timer, error) = match result {
        Ok(timer) => (timer, None),
        Err(ServiceError::Validation(errors)) => (
            timer_service::timer_detail(state, &user.id, timer_id).await?,
            Some(public_message(&errors)),
        ),
        Err(err) => return Err(err.into()),
    };
    render_page(
        state,
        "partials/levels.html",
        &TimerPage {
            user: Some(user.id),
            timer,
            error,
        },
    )
}
