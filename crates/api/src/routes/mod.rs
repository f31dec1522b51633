//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                 - Liveness check
//! GET    /health/ready           - Readiness check (document store ping)
//!
//! # Products and customers (writes require login)
//! GET    /products               - List products
//! POST   /products               - Create product
//! GET    /products/{id}          - Get product
//! PUT    /products/{id}          - Replace product
//! DELETE /products/{id}          - Delete product
//! (same five routes under /customers)
//!
//! # Reviews
//! POST   /reviews                - Create review (requires login)
//! GET    /reviews/{name}         - Reviews of a product, by name
//!
//! # GitHub OAuth
//! GET    /auth/github            - Redirect to GitHub
//! GET    /auth/github/callback   - Handle OAuth callback
//! GET    /profile                - Current user (requires login)
//! GET    /logout                 - Log out
//! ```

pub mod auth;
pub mod resources;
pub mod reviews;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::models::{Customer, Product, Resource, Review};
use crate::state::AppState;

/// Create the application router (without middleware).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(resource_routes::<Product>("/products"))
        .merge(resource_routes::<Customer>("/customers"))
        .route("/reviews", post(resources::create::<Review>))
        .route("/reviews/{name}", get(reviews::by_name))
        .merge(auth_routes())
}

/// The five CRUD routes for one resource, mounted at `path`.
fn resource_routes<R: Resource>(path: &str) -> Router<AppState> {
    Router::new()
        .route(
            path,
            get(resources::index::<R>).post(resources::create::<R>),
        )
        .route(
            &format!("{path}/{{id}}"),
            get(resources::show::<R>)
                .put(resources::replace::<R>)
                .delete(resources::destroy::<R>),
        )
}

/// Create the auth routes router.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/github", get(auth::login))
        .route("/auth/github/callback", get(auth::callback))
        .route("/profile", get(auth::profile))
        .route("/logout", get(auth::logout))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the document store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.gateway().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
