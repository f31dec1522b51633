//! Integration tests for the Eko Store API.
//!
//! These tests talk HTTP to a running server and are `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the server against a migrated database
//! cargo run -p eko-store-cli -- migrate
//! cargo run -p eko-store-api
//!
//! # Run integration tests
//! cargo test -p eko-store-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `API_BASE_URL` - Server under test (default: `http://localhost:3000`)
//! - `EKO_SESSION_COOKIE` - `eko_session=...` cookie from a browser login;
//!   tests that need a logged-in user skip themselves without it

use reqwest::{Client, RequestBuilder, header};

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Absolute URL for a path on the server under test.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", base_url())
}

/// HTTP client that does not follow redirects, so OAuth hops can be asserted.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Session cookie of a logged-in user, if provided.
#[must_use]
pub fn session_cookie() -> Option<String> {
    std::env::var("EKO_SESSION_COOKIE")
        .ok()
        .filter(|c| !c.is_empty())
}

/// Attach the logged-in session cookie to a request.
#[must_use]
pub fn authenticated(request: RequestBuilder, cookie: &str) -> RequestBuilder {
    request.header(header::COOKIE, cookie)
}

/// Product payload that passes validation.
#[must_use]
pub fn widget(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "description": "Integration test widget",
        "price": 9.99,
        "stock": 5,
        "category": "misc",
        "imageUrl": "https://cdn.example.org/widget.png",
    })
}
