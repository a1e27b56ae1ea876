//! Resolves the authenticated user from the header set by the identity proxy.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::{config::AppConfig, error::AppError, state::SharedState};

/// User on whose behalf the request runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// Opaque id from the identity provider.
    pub id: String,
}

/// User id from the trusted header, or the development user when running in development.
pub fn resolve_user(config: &AppConfig, headers: &HeaderMap) -> Option<CurrentUser> {
    let from_header = headers
        .get(config.identity.user_header.as_str())
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned);

    let dev_user = || {
        config
            .identity
            .dev_user
            .clone()
            .filter(|_| config.is_development())
    };

    from_header.or_else(dev_user).map(|id| CurrentUser { id })
}

/// Reject requests without an authenticated user and expose it as an extension.
pub async fn require_user(
    State(state): State<SharedState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = resolve_user(state.config(), req.headers()).ok_or_else(|| {
        debug!(path = %req.uri().path(), "request without authenticated user");
        AppError::Unauthorized("authentication required".into())
    })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::config::{Environment, IdentityConfig};

    fn config(environment: Environment, dev_user: Option<&str>) -> AppConfig {
        AppConfig {
            environment,
            identity: IdentityConfig {
                dev_user: dev_user.map(str::to_owned),
                ..IdentityConfig::default()
            },
            ..AppConfig::default()
        }
    }

    #[test]
    fn header_wins_over_the_development_user() {
        let mut headers = HeaderMap::new();
        headers.insert("x-authenticated-user", HeaderValue::from_static(" alice "));
        let user = resolve_user(&config(Environment::Development, Some("dev")), &headers);
        assert_eq!(user.map(|u| u.id).as_deref(), Some("alice"));
    }

    #[test]
    fn development_user_is_ignored_in_production() {
        let headers = HeaderMap::new();
        assert_eq!(
            resolve_user(&config(Environment::Development, Some("dev")), &headers)
                .map(|u| u.id)
                .as_deref(),
            Some("dev")
        );
        assert!(resolve_user(&config(Environment::Production, Some("dev")), &headers).is_none());
    }

    #[test]
    fn blank_header_counts_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert("x-authenticated-user", HeaderValue::from_static("   "));
        assert!(resolve_user(&config(Environment::Production, None), &headers).is_none());
    }
}
