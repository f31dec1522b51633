//! Authentication service.
//!
//! Login is delegated to an [`OAuthProvider`] (GitHub in production). A
//! successful callback upserts the [`User`] by provider ID and binds its
//! document ID into the session through [`SessionGate`].

mod error;
mod gate;
pub mod github;

pub use error::{AuthError, ProviderError};
pub use gate::SessionGate;
pub use github::GitHubClient;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use eko_store_core::UserId;

use crate::db::{Gateway, UserRepository};
use crate::models::{ProfileEmail, Stored, User};

/// An OAuth access token issued by the provider.
#[derive(Debug, Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for provider calls and storage.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// The identity returned by the provider after a successful grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    /// Stable provider account ID.
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub profile_url: String,
    /// Primary address first.
    pub emails: Vec<String>,
}

impl ProviderProfile {
    /// The stored user record for this profile and token.
    #[must_use]
    pub fn into_user(self, token: &AccessToken) -> User {
        User {
            github_id: self.id,
            username: self.username,
            display_name: self.display_name,
            profile_url: self.profile_url,
            emails: self
                .emails
                .into_iter()
                .map(|value| ProfileEmail { value })
                .collect(),
            access_token: token.expose().to_string(),
        }
    }
}

/// An OAuth 2.0 authorization-code provider.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// URL to send the user to; `state` comes back on the callback.
    fn authorization_url(&self, state: &str) -> String;

    /// Trade an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<AccessToken, ProviderError>;

    /// Read the account behind a token.
    async fn fetch_profile(&self, token: &AccessToken) -> Result<ProviderProfile, ProviderError>;

    /// Invalidate a token with the provider.
    async fn revoke_token(&self, token: &AccessToken) -> Result<(), ProviderError>;
}

/// Authentication service.
///
/// Handles the provider exchange, the user upsert, and token revocation.
pub struct AuthService<'a> {
    users: UserRepository,
    provider: &'a dyn OAuthProvider,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the gateway has no store.
    pub fn new(gateway: &Gateway, provider: &'a dyn OAuthProvider) -> Result<Self, AuthError> {
        Ok(Self {
            users: UserRepository::new(gateway)?,
            provider,
        })
    }

    /// Exchange the callback code, read the profile and upsert the user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Provider` if the exchange or profile read fails.
    pub async fn complete_login(&self, code: &str) -> Result<Stored<User>, AuthError> {
        let token = self.provider.exchange_code(code).await?;
        let profile = self.provider.fetch_profile(&token).await?;
        let user = self
            .users
            .upsert_by_github_id(profile.into_user(&token))
            .await?;
        Ok(user)
    }

    /// The user bound to a session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the record was removed.
    pub async fn current_user(&self, id: UserId) -> Result<Stored<User>, AuthError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Revoke the user's stored token with the provider.
    ///
    /// Best effort: provider failures are logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the user lookup fails.
    pub async fn revoke(&self, id: UserId) -> Result<(), AuthError> {
        let Some(user) = self.users.find_by_id(id).await? else {
            tracing::warn!(user_id = %id, "Logout for a user that no longer exists");
            return Ok(());
        };

        let token = AccessToken::new(user.entity.access_token);
        if let Err(e) = self.provider.revoke_token(&token).await {
            tracing::warn!(user_id = %id, error = %e, "Failed to revoke GitHub token");
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Provider double: every code except `"bad"` is granted to one account.
    #[derive(Debug, Default)]
    pub struct FakeProvider {
        exchanges: AtomicUsize,
        /// Tokens passed to `revoke_token`, whether or not it succeeded.
        pub revoked: parking_lot::Mutex<Vec<String>>,
        refuse_revocation: bool,
    }

    impl FakeProvider {
        /// A provider whose revocation endpoint is down.
        pub fn refusing_revocation() -> Self {
            Self {
                refuse_revocation: true,
                ..Self::default()
            }
        }

        pub fn profile() -> ProviderProfile {
            ProviderProfile {
                id: "583231".to_string(),
                username: "octocat".to_string(),
                display_name: Some("The Octocat".to_string()),
                profile_url: "https://github.com/octocat".to_string(),
                emails: vec!["octocat@github.com".to_string()],
            }
        }
    }

    #[async_trait]
    impl OAuthProvider for FakeProvider {
        fn authorization_url(&self, state: &str) -> String {
            format!("https://github.test/login/oauth/authorize?state={state}")
        }

        async fn exchange_code(&self, code: &str) -> Result<AccessToken, ProviderError> {
            if code == "bad" {
                return Err(ProviderError::OAuth("bad_verification_code".to_string()));
            }
            let n = self.exchanges.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(AccessToken::new(format!("gho_token_{n}")))
        }

        async fn fetch_profile(
            &self,
            _token: &AccessToken,
        ) -> Result<ProviderProfile, ProviderError> {
            Ok(Self::profile())
        }

        async fn revoke_token(&self, token: &AccessToken) -> Result<(), ProviderError> {
            self.revoked.lock().push(token.expose().to_string());
            if self.refuse_revocation {
                return Err(ProviderError::Status {
                    status: 503,
                    body: "revocation unavailable".to_string(),
                });
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::test_support::FakeProvider;
    use super::*;
    use crate::db::MemoryDocumentStore;

    #[tokio::test]
    async fn test_login_twice_keeps_one_user_with_latest_token() {
        let gateway = Gateway::with_store(MemoryDocumentStore::new());
        let provider = FakeProvider::default();
        let auth = AuthService::new(&gateway, &provider).unwrap();

        let first = auth.complete_login("code-1").await.unwrap();
        let second = auth.complete_login("code-2").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.entity.access_token, "gho_token_2");
        let users = gateway.collection("users").unwrap().find_all().await.unwrap();
        assert_eq!(users.len(), 1);

        let current = auth.current_user(second.id.into()).await.unwrap();
        assert_eq!(current.entity.access_token, "gho_token_2");
        assert_eq!(current.entity.emails[0].value, "octocat@github.com");
    }

    #[tokio::test]
    async fn test_rejected_code_creates_nothing() {
        let gateway = Gateway::with_store(MemoryDocumentStore::new());
        let provider = FakeProvider::default();
        let auth = AuthService::new(&gateway, &provider).unwrap();

        assert!(matches!(
            auth.complete_login("bad").await,
            Err(AuthError::Provider(ProviderError::OAuth(_)))
        ));
        let users = gateway.collection("users").unwrap().find_all().await.unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_revoke_uses_stored_token() {
        let gateway = Gateway::with_store(MemoryDocumentStore::new());
        let provider = FakeProvider::default();
        let auth = AuthService::new(&gateway, &provider).unwrap();

        let user = auth.complete_login("code").await.unwrap();
        auth.revoke(user.id.into()).await.unwrap();
        assert_eq!(*provider.revoked.lock(), vec!["gho_token_1".to_string()]);

        // Unknown users are a no-op
        auth.revoke(UserId::generate()).await.unwrap();
        assert_eq!(provider.revoked.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_revoke_failure_is_not_an_error() {
        let gateway = Gateway::with_store(MemoryDocumentStore::new());
        let provider = FakeProvider::refusing_revocation();
        let auth = AuthService::new(&gateway, &provider).unwrap();

        let user = auth.complete_login("code").await.unwrap();
        assert!(auth.revoke(user.id.into()).await.is_ok());
        assert_eq!(*provider.revoked.lock(), vec!["gho_token_1".to_string()]);
    }

    #[tokio::test]
    async fn test_current_user_missing() {
        let gateway = Gateway::with_store(MemoryDocumentStore::new());
        let provider = FakeProvider::default();
        let auth = AuthService::new(&gateway, &provider).unwrap();
        assert!(matches!(
            auth.current_user(UserId::generate()).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("gho_secret");
        assert!(!format!("{token:?}").contains("gho_secret"));
        assert_eq!(token.expose(), "gho_secret");
    }
}
