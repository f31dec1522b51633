//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::InvalidTransition;

/// Errors returned by the OAuth provider client.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure talking to the provider.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with an OAuth error (e.g. `bad_verification_code`).
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// The provider answered with an unexpected status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider denied the grant or failed the exchange.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Callback did not match the pending login (missing code, CSRF mismatch).
    #[error("invalid session state")]
    InvalidSessionState,

    /// The session was asked to make a move its state does not allow.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    /// The session store failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The session names a user that no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
