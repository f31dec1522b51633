//! GitHub OAuth route handlers.
//!
//! - Login: Redirects to GitHub's authorization page
//! - Callback: Verifies the grant, upserts the user and binds the session
//! - Profile: Returns the logged-in user
//! - Logout: Revokes the GitHub token and destroys the session

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, UserProfile};
use crate::services::auth::{AuthService, SessionGate};
use crate::state::AppState;

/// Query parameters from the GitHub OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for a token.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed (e.g. `access_denied`).
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

/// Start a GitHub login.
///
/// # Route
///
/// `GET /auth/github`
pub async fn login(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    let csrf = SessionGate::new(session).begin_login().await?;
    Ok(Redirect::to(&state.provider().authorization_url(&csrf)))
}

/// Abandon the pending login and send the user home.
async fn reject(gate: &SessionGate) -> Response {
    if let Err(e) = gate.fail_login().await {
        tracing::error!(error = %e, "Failed to reset session after rejected login");
    }
    Redirect::to("/").into_response()
}

/// Handle the GitHub OAuth callback.
///
/// # Route
///
/// `GET /auth/github/callback`
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let gate = SessionGate::new(session);

    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!("GitHub OAuth error: {} - {}", error, description);
        return reject(&gate).await;
    }

    let (Some(code), Some(returned_state)) = (query.code, query.state) else {
        tracing::warn!("GitHub OAuth callback missing code or state");
        return reject(&gate).await;
    };

    if let Err(e) = gate.verify_callback(&returned_state).await {
        tracing::warn!(error = %e, "GitHub OAuth state mismatch");
        return reject(&gate).await;
    }

    let auth = match AuthService::new(state.gateway(), state.provider()) {
        Ok(auth) => auth,
        Err(e) => {
            tracing::error!(error = %e, "Auth service unavailable");
            return reject(&gate).await;
        }
    };

    let user = match auth.complete_login(&code).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "GitHub login failed");
            return reject(&gate).await;
        }
    };

    let current = CurrentUser {
        id: user.id.into(),
        username: user.entity.username.clone(),
    };
    if let Err(e) = gate.complete_login(current).await {
        tracing::error!(error = %e, "Failed to bind user to session");
        return reject(&gate).await;
    }

    set_sentry_user(&user.id, &user.entity.username);
    tracing::info!(user_id = %user.id, username = %user.entity.username, "User logged in");

    Redirect::to("/profile").into_response()
}

/// The logged-in user's profile.
///
/// # Route
///
/// `GET /profile`
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<UserProfile>> {
    let auth = AuthService::new(state.gateway(), state.provider())?;
    let stored = auth.current_user(user.id).await?;
    Ok(Json(stored.entity.profile(stored.id.into())))
}

/// Log out.
///
/// Revocation with GitHub is best effort; the local session is always
/// destroyed.
///
/// # Route
///
/// `GET /logout`
pub async fn logout(State(state): State<AppState>, session: Session) -> Redirect {
    let gate = SessionGate::new(session);

    match gate.logout().await {
        Ok(Some(user)) => {
            match AuthService::new(state.gateway(), state.provider()) {
                Ok(auth) => {
                    if let Err(e) = auth.revoke(user.id).await {
                        tracing::warn!(error = %e, "Failed to look up user for token revocation");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Auth service unavailable during logout"),
            }
            tracing::info!(user_id = %user.id, username = %user.username, "User logged out");
        }
        Ok(None) => {}
        Err(e) => tracing::error!(error = %e, "Failed to clear session on logout"),
    }

    clear_sentry_user();
    Redirect::to("/")
}
