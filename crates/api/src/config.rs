//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `GITHUB_CLIENT_ID` - GitHub OAuth app client ID
//! - `GITHUB_CLIENT_SECRET` - GitHub OAuth app client secret
//! - `CALLBACK_URL` - Absolute URL of `/auth/github/callback` as registered with GitHub
//! - `SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Signing keys are derived from the session secret, so it must be long.
const SESSION_SECRET_MIN_LEN: usize = 32;
const CLIENT_SECRET_MIN_LEN: usize = 16;

/// Bits of Shannon entropy per character below which a secret is rejected.
const MIN_BITS_PER_CHAR: f64 = 3.3;

/// Lowercase fragments that only show up in copied sample values.
const SAMPLE_MARKERS: &[&str] = &[
    "changeme",
    "placeholder",
    "example",
    "secret",
    "password",
    "your-",
    "your_",
    "xxx",
    "todo",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
    #[error("Weak secret in {var}: {reason}")]
    WeakSecret { var: &'static str, reason: String },
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Session signing secret
    pub session_secret: SecretString,
    /// GitHub OAuth configuration
    pub github: GitHubConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// GitHub OAuth app configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct GitHubConfig {
    /// OAuth app client ID
    pub client_id: String,
    /// OAuth app client secret
    pub client_secret: SecretString,
    /// Where GitHub sends the user back after authorization
    pub callback_url: Url,
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("callback_url", &self.callback_url.as_str())
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host = parsed("HOST", "127.0.0.1")?;
        let port = parsed("PORT", "3000")?;

        Ok(Self {
            database_url: SecretString::from(required("DATABASE_URL")?),
            host,
            port,
            session_secret: secret("SESSION_SECRET", SESSION_SECRET_MIN_LEN)?,
            github: GitHubConfig::from_env()?,
            sentry_dsn: optional("SENTRY_DSN"),
            sentry_environment: optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the public URL is served over HTTPS (enables secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.github.callback_url.scheme() == "https"
    }
}

impl GitHubConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: required("GITHUB_CLIENT_ID")?,
            client_secret: secret("GITHUB_CLIENT_SECRET", CLIENT_SECRET_MIN_LEN)?,
            callback_url: parse_callback_url(&required("CALLBACK_URL")?)?,
        })
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::Missing(var))
}

fn optional(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

/// Parse a variable, falling back to `default` when unset.
fn parsed<T>(var: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(var)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        })
}

/// The callback must be an absolute http(s) URL.
fn parse_callback_url(value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        var: "CALLBACK_URL",
        reason,
    };
    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

/// Read a secret and reject values that look copied from a sample `.env`.
fn secret(var: &'static str, min_len: usize) -> Result<SecretString, ConfigError> {
    let value = required(var)?;
    match weakness(&value, min_len) {
        Some(reason) => Err(ConfigError::WeakSecret { var, reason }),
        None => Ok(SecretString::from(value)),
    }
}

fn weakness(value: &str, min_len: usize) -> Option<String> {
    let len = value.chars().count();
    if len < min_len {
        return Some(format!("needs at least {min_len} characters, got {len}"));
    }

    let lower = value.to_lowercase();
    if let Some(marker) = SAMPLE_MARKERS.iter().find(|m| lower.contains(*m)) {
        return Some(format!("looks like a sample value (contains '{marker}')"));
    }

    let bits = bits_per_char(value);
    (bits < MIN_BITS_PER_CHAR).then(|| {
        format!("only {bits:.2} bits of entropy per character; generate a random value")
    })
}

/// Shannon entropy of the character distribution.
#[allow(clippy::cast_precision_loss)]
fn bits_per_char(value: &str) -> f64 {
    let mut chars: Vec<char> = value.chars().collect();
    if chars.is_empty() {
        return 0.0;
    }
    chars.sort_unstable();

    let total = chars.len() as f64;
    chars
        .chunk_by(|a, b| a == b)
        .map(|run| {
            let p = run.len() as f64 / total;
            -p * p.log2()
        })
        .sum()
}
