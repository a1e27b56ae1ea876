use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" or "degraded".
    pub status: String,
    /// Deployment environment the server runs in.
    pub environment: String,
}

impl HealthResponse {
    /// Storage answered its health check.
    pub fn ok(environment: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            environment: environment.into(),
        }
    }

    /// Storage is unreachable; timer pages fail until it comes back.
    pub fn degraded(environment: impl Into<String>) -> Self {
        Self {
            status: "degraded".to_string(),
            environment: environment.into(),
        }
    }
}
