use utoipa::OpenApi;

#[derive(OpenApi)]
/// OpenAPI document for the blind timer JSON API.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::api::list_timers,
        crate::routes::api::get_timer,
        crate::routes::api::get_masthead,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::dashboard::TimerSummary,
            crate::dto::dashboard::TimerDetail,
            crate::dto::play::LevelView,
            crate::dto::play::MastheadView,
            crate::dto::play::Controls,
            crate::dto::play::CueRef,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "timers", description = "Timers owned by the authenticated user"),
        (name = "play", description = "Playback state of a timer"),
    )
)]
pub struct ApiDoc;
