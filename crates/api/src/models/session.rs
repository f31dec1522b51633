//! Session-related types.
//!
//! The login lifecycle is an explicit state machine stored in the session
//! under [`session_keys::AUTH_STATE`]:
//!
//! ```text
//! Anonymous ──BeginLogin──▶ PendingProviderRedirect ──ProviderGranted──▶ Authenticated
//!     ▲                              │                                     │
//!     │◀────────ProviderRejected─────┘                                  Logout
//!     │                                                                    ▼
//!     └───────────────────────SessionCleared────────────────────────── LoggedOut
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use eko_store_core::UserId;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's document ID.
    pub id: UserId,
    /// GitHub login, for log lines.
    pub username: String,
}

/// Where a session is in the login lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthState {
    /// No identity bound.
    #[default]
    Anonymous,
    /// Sent to the provider; waiting for the callback carrying `csrf`.
    PendingProviderRedirect { csrf: String },
    /// Identity bound to the session.
    Authenticated { user: CurrentUser },
    /// Logout accepted; the session is about to be destroyed.
    LoggedOut,
}

/// Inputs that move a session between states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// The client asked to log in; `csrf` goes out with the redirect.
    BeginLogin { csrf: String },
    /// The provider callback was verified and the user upserted.
    ProviderGranted { user: CurrentUser },
    /// The provider denied the grant, or the callback failed verification.
    ProviderRejected,
    /// The client asked to log out.
    Logout,
    /// Server-side session data was destroyed.
    SessionCleared,
}

/// An event that is not allowed in the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot apply {event} while {state}")]
pub struct InvalidTransition {
    pub state: &'static str,
    pub event: &'static str,
}

impl AuthState {
    /// Apply an event, returning the next state.
    ///
    /// Logging in again from any state restarts the flow, and logging out
    /// is accepted from any state so that `/logout` is always safe to call.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` for a provider result outside a pending
    /// login, or a clear before logout.
    pub fn transition(self, event: AuthEvent) -> Result<Self, InvalidTransition> {
        match (self, event) {
            (_, AuthEvent::BeginLogin { csrf }) => Ok(Self::PendingProviderRedirect { csrf }),
            (Self::PendingProviderRedirect { .. }, AuthEvent::ProviderGranted { user }) => {
                Ok(Self::Authenticated { user })
            }
            (Self::PendingProviderRedirect { .. }, AuthEvent::ProviderRejected) => {
                Ok(Self::Anonymous)
            }
            (_, AuthEvent::Logout) => Ok(Self::LoggedOut),
            (Self::LoggedOut, AuthEvent::SessionCleared) => Ok(Self::Anonymous),
            (state, event) => Err(InvalidTransition {
                state: state.name(),
                event: event.name(),
            }),
        }
    }

    /// Whether the callback `state` parameter matches the pending login.
    #[must_use]
    pub fn expects_csrf(&self, returned: &str) -> bool {
        matches!(self, Self::PendingProviderRedirect { csrf } if csrf == returned)
    }

    /// The bound user, if authenticated.
    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        match self {
            Self::Authenticated { user } => Some(user),
            _ => None,
        }
    }

    /// State name for logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::PendingProviderRedirect { .. } => "pending_provider_redirect",
            Self::Authenticated { .. } => "authenticated",
            Self::LoggedOut => "logged_out",
        }
    }
}

impl AuthEvent {
    const fn name(&self) -> &'static str {
        match self {
            Self::BeginLogin { .. } => "begin_login",
            Self::ProviderGranted { .. } => "provider_granted",
            Self::ProviderRejected => "provider_rejected",
            Self::Logout => "logout",
            Self::SessionCleared => "session_cleared",
        }
    }
}

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for the serialized [`AuthState`](super::AuthState).
    pub const AUTH_STATE: &str = "auth_state";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user() -> CurrentUser {
        CurrentUser {
            id: UserId::generate(),
            username: "octocat".to_string(),
        }
    }

    fn pending() -> AuthState {
        AuthState::Anonymous
            .transition(AuthEvent::BeginLogin {
                csrf: "abc".to_string(),
            })
            .unwrap()
    }

    #[test]
    fn test_full_lifecycle() {
        let u = user();
        let state = pending()
            .transition(AuthEvent::ProviderGranted { user: u.clone() })
            .unwrap();
        assert_eq!(state.user(), Some(&u));

        let state = state.transition(AuthEvent::Logout).unwrap();
        assert_eq!(state, AuthState::LoggedOut);
        assert!(state.user().is_none());

        let state = state.transition(AuthEvent::SessionCleared).unwrap();
        assert_eq!(state, AuthState::Anonymous);
    }

    #[test]
    fn test_rejected_grant_returns_to_anonymous() {
        let state = pending().transition(AuthEvent::ProviderRejected).unwrap();
        assert_eq!(state, AuthState::Anonymous);
    }

    #[test]
    fn test_grant_requires_pending_login() {
        let err = AuthState::Anonymous
            .transition(AuthEvent::ProviderGranted { user: user() })
            .unwrap_err();
        assert_eq!(err.state, "anonymous");
        assert_eq!(err.event, "provider_granted");
    }

    #[test]
    fn test_clear_requires_logout() {
        assert!(
            AuthState::Authenticated { user: user() }
                .transition(AuthEvent::SessionCleared)
                .is_err()
        );
    }

    #[test]
    fn test_relogin_from_authenticated() {
        let state = AuthState::Authenticated { user: user() }
            .transition(AuthEvent::BeginLogin {
                csrf: "xyz".to_string(),
            })
            .unwrap();
        assert!(state.expects_csrf("xyz"));
        assert!(state.user().is_none());
    }

    #[test]
    fn test_expects_csrf() {
        let state = pending();
        assert!(state.expects_csrf("abc"));
        assert!(!state.expects_csrf("abd"));
        assert!(!AuthState::Anonymous.expects_csrf("abc"));
    }

    #[test]
    fn test_state_serialization_is_tagged() {
        let json = serde_json::to_value(pending()).unwrap();
        assert_eq!(json["state"], "pending_provider_redirect");
        assert_eq!(json["csrf"], "abc");

        let back: AuthState = serde_json::from_value(json).unwrap();
        assert!(back.expects_csrf("abc"));
    }
}
