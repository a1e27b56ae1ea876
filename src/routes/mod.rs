use axum::{
    Router, middleware,
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;

use crate::{error::AppError, state::SharedState};

/// Read-only JSON API.
pub mod api;
/// Timer management pages and the public home page.
pub mod dashboard;
/// Swagger UI.
pub mod docs;
/// Health check.
pub mod health;
/// Authenticated user resolution.
pub mod identity;
/// Playback pages, transitions and cue audio.
pub mod play;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let authenticated = dashboard::router()
        .merge(play::router())
        .merge(api::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            identity::require_user,
        ));

    dashboard::public_router()
        .merge(health::router())
        .merge(docs::router())
        .merge(authenticated)
        .with_state(state)
}

/// Render `template` with the shared renderer.
pub(crate) fn render_page<T: Serialize>(
    state: &SharedState,
    template: &str,
    data: &T,
) -> Result<Html<String>, AppError> {
    Ok(Html(state.renderer().render(template, data)?))
}

#[derive(Serialize)]
struct ErrorPage<'a> {
    user: Option<&'a str>,
    status: u16,
    title: &'a str,
    error: String,
}

/// Answer a full-page route: the page itself, or an HTML error page carrying
/// the error's status. Falls back to the JSON error if the page cannot render.
pub(crate) fn page_or_error<T: IntoResponse>(
    state: &SharedState,
    user: Option<&str>,
    result: Result<T, AppError>,
) -> Response {
    let err = match result {
        Ok(page) => return page.into_response(),
        Err(err) => err,
    };

    let status = err.status();
    let page = ErrorPage {
        user,
        status: status.as_u16(),
        title: status.canonical_reason().unwrap_or("Error"),
        error: err.to_string(),
    };
    match render_page(state, "error.html", &page) {
        Ok(html) => (status, html).into_response(),
        Err(_) => err.into_response(),
    }
}
