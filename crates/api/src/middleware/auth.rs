//! Authentication extractors.
//!
//! Provides extractors for requiring a GitHub login in route handlers. The
//! extractors only read the session; they never touch the request body, so a
//! handler taking `RequireAuth` before its body rejects anonymous callers
//! before any parsing or validation.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::CurrentUser;
use crate::services::auth::SessionGate;

/// Message returned with every 401.
pub const UNAUTHORIZED_MESSAGE: &str =
    "Unauthorized. Please log in with GitHub to access this resource.";

/// Extractor that requires an authenticated session.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalAuth(user) = OptionalAuth::from_request_parts(parts, state)
            .await
            .unwrap_or(OptionalAuth(None));

        user.map(Self)
            .ok_or_else(|| AppError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            return Ok(Self(None));
        };

        let user = match SessionGate::new(session).current_user().await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read auth state from session");
                None
            }
        };

        Ok(Self(user))
    }
}
