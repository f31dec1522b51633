//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::Gateway;
use crate::services::auth::{GitHubClient, OAuthProvider};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the document store and the OAuth provider.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    gateway: Gateway,
    provider: Arc<dyn OAuthProvider>,
}

impl AppState {
    /// Create a new application state with the GitHub provider.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `gateway` - Connected document store gateway
    #[must_use]
    pub fn new(config: ApiConfig, gateway: Gateway) -> Self {
        let provider = Arc::new(GitHubClient::new(&config.github));
        Self::with_provider(config, gateway, provider)
    }

    /// Create application state with a specific OAuth provider.
    #[must_use]
    pub fn with_provider(
        config: ApiConfig,
        gateway: Gateway,
        provider: Arc<dyn OAuthProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                gateway,
                provider,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the persistence gateway.
    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.inner.gateway
    }

    /// Get a reference to the OAuth provider.
    #[must_use]
    pub fn provider(&self) -> &dyn OAuthProvider {
        self.inner.provider.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("gateway", &self.inner.gateway)
            .finish_non_exhaustive()
    }
}
