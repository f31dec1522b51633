//! GitHub OAuth client.
//!
//! # OAuth Flow
//!
//! 1. Generate authorization URL with `authorization_url()`
//! 2. Redirect the user to GitHub's consent page
//! 3. GitHub redirects back with an authorization code
//! 4. Exchange the code for an access token with `exchange_code()`
//! 5. Read the profile and email list with `fetch_profile()`
//! 6. On logout, revoke the token with `revoke_token()`

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{AccessToken, OAuthProvider, ProviderError, ProviderProfile};
use crate::config::GitHubConfig;

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const API_BASE: &str = "https://api.github.com";

/// Requested scopes: public profile plus the email list.
const SCOPE: &str = "user:email";

/// GitHub rejects API calls without a User-Agent.
const USER_AGENT: &str = concat!("eko-store-api/", env!("CARGO_PKG_VERSION"));

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    id: u64,
    login: String,
    name: Option<String>,
    html_url: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubEmail {
    email: String,
    #[serde(default)]
    primary: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Client for GitHub's OAuth and REST endpoints.
#[derive(Clone)]
pub struct GitHubClient {
    inner: Arc<GitHubClientInner>,
}

struct GitHubClientInner {
    client: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    callback_url: String,
}

impl GitHubClient {
    /// Create a new GitHub client.
    #[must_use]
    pub fn new(config: &GitHubConfig) -> Self {
        Self {
            inner: Arc::new(GitHubClientInner {
                client: reqwest::Client::new(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                callback_url: config.callback_url.to_string(),
            }),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        token: &AccessToken,
    ) -> Result<T, ProviderError> {
        let response = self
            .inner
            .client
            .get(format!("{API_BASE}{path}"))
            .bearer_auth(token.expose())
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("client_id", &self.inner.client_id)
            .field("callback_url", &self.inner.callback_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl OAuthProvider for GitHubClient {
    fn authorization_url(&self, state: &str) -> String {
        format!(
            "{AUTHORIZE_URL}?\
            client_id={}&\
            redirect_uri={}&\
            scope={}&\
            state={}",
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(&self.inner.callback_url),
            urlencoding::encode(SCOPE),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<AccessToken, ProviderError> {
        let params = [
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.expose_secret()),
            ("code", code),
            ("redirect_uri", self.inner.callback_url.as_str()),
        ];

        let response = self
            .inner
            .client
            .post(TOKEN_URL)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // GitHub reports exchange failures with 200 and an `error` field.
        let token: TokenResponse = response.json().await?;
        match (token.access_token, token.error) {
            (Some(access_token), None) => Ok(AccessToken::new(access_token)),
            (_, Some(error)) => Err(ProviderError::OAuth(match token.error_description {
                Some(description) => format!("{error}: {description}"),
                None => error,
            })),
            (None, None) => Err(ProviderError::OAuth(
                "token response without access_token".to_string(),
            )),
        }
    }

    async fn fetch_profile(&self, token: &AccessToken) -> Result<ProviderProfile, ProviderError> {
        let user: GitHubUser = self.get_json("/user", token).await?;

        // The email list needs the `user:email` scope; fall back to the public
        // address if the user declined it.
        let emails = match self.get_json::<Vec<GitHubEmail>>("/user/emails", token).await {
            Ok(mut list) => {
                list.sort_by_key(|e| !e.primary);
                list.into_iter().map(|e| e.email).collect()
            }
            Err(e) => {
                tracing::warn!(error = %e, login = %user.login, "Could not read GitHub email list");
                user.email.into_iter().collect()
            }
        };

        Ok(ProviderProfile {
            id: user.id.to_string(),
            username: user.login,
            display_name: user.name,
            profile_url: user.html_url,
            emails,
        })
    }

    async fn revoke_token(&self, token: &AccessToken) -> Result<(), ProviderError> {
        let response = self
            .inner
            .client
            .delete(format!(
                "{API_BASE}/applications/{}/token",
                self.inner.client_id
            ))
            .basic_auth(
                &self.inner.client_id,
                Some(self.inner.client_secret.expose_secret()),
            )
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .json(&serde_json::json!({ "access_token": token.expose() }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
