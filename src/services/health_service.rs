use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether storage is usable, probing the installed store.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let environment = state.config().environment.to_string();
    match state.require_timer_store().await {
        Ok(store) => match store.health_check().await {
            Ok(()) => HealthResponse::ok(environment),
            Err(err) => {
                warn!(error = %err, "storage health check failed");
                HealthResponse::degraded(environment)
            }
        },
        Err(_) => {
            warn!("storage unavailable (degraded mode)");
            HealthResponse::degraded(environment)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::memory_state;

    #[tokio::test]
    async fn reports_degraded_mode() {
        let state = memory_state().await;
        assert_eq!(health_status(&state).await.status, "ok");

        state.update_degraded(true);
        let health = health_status(&state).await;
        assert_eq!(health.status, "degraded");
        assert_eq!(health.environment, "development");
    }
}
