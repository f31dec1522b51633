//! Session-backed login state.
//!
//! [`SessionGate`] is the only code that reads or writes
//! [`session_keys::AUTH_STATE`]. Every change goes through
//! [`AuthState::transition`], so the stored state is always one the state
//! machine can reach.

use rand::Rng;
use rand::distr::Alphanumeric;
use tower_sessions::Session;

use super::AuthError;
use crate::models::{AuthEvent, AuthState, CurrentUser, session_keys};

/// Length of the CSRF `state` parameter.
const CSRF_TOKEN_LENGTH: usize = 32;

/// Generate a cryptographically secure random string.
fn generate_csrf_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CSRF_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Login state for one session.
#[derive(Debug, Clone)]
pub struct SessionGate {
    session: Session,
}

impl SessionGate {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Current state; sessions without one are anonymous.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session store fails.
    pub async fn state(&self) -> Result<AuthState, AuthError> {
        Ok(self
            .session
            .get::<AuthState>(session_keys::AUTH_STATE)
            .await?
            .unwrap_or_default())
    }

    async fn apply(&self, event: AuthEvent) -> Result<AuthState, AuthError> {
        let next = self.state().await?.transition(event)?;
        self.session.insert(session_keys::AUTH_STATE, &next).await?;
        Ok(next)
    }

    /// Start a login and return the CSRF token to send to the provider.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session store fails.
    pub async fn begin_login(&self) -> Result<String, AuthError> {
        let csrf = generate_csrf_token();
        self.apply(AuthEvent::BeginLogin { csrf: csrf.clone() })
            .await?;
        Ok(csrf)
    }

    /// Check the callback's `state` parameter against the pending login.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidSessionState` on a mismatch or when no
    /// login is pending.
    pub async fn verify_callback(&self, returned: &str) -> Result<(), AuthError> {
        if self.state().await?.expects_csrf(returned) {
            Ok(())
        } else {
            Err(AuthError::InvalidSessionState)
        }
    }

    /// Bind a user to the session, rotating the session ID first.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidTransition` if no login is pending.
    pub async fn complete_login(&self, user: CurrentUser) -> Result<(), AuthError> {
        self.session.cycle_id().await?;
        self.apply(AuthEvent::ProviderGranted { user }).await?;
        Ok(())
    }

    /// Abandon a pending login. No-op in any other state.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session store fails.
    pub async fn fail_login(&self) -> Result<(), AuthError> {
        if matches!(
            self.state().await?,
            AuthState::PendingProviderRedirect { .. }
        ) {
            self.apply(AuthEvent::ProviderRejected).await?;
        }
        Ok(())
    }

    /// The authenticated user, if any.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session store fails.
    pub async fn current_user(&self) -> Result<Option<CurrentUser>, AuthError> {
        Ok(self.state().await?.user().cloned())
    }

    /// Log out and destroy the server-side session.
    ///
    /// Returns the user that was bound, if any.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session store fails.
    pub async fn logout(&self) -> Result<Option<CurrentUser>, AuthError> {
        let user = self.current_user().await?;
        let state = self.apply(AuthEvent::Logout).await?;
        self.session.flush().await?;
        state.transition(AuthEvent::SessionCleared)?;
        Ok(user)
    }
}
