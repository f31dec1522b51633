//! Business logic services.
//!
//! # Services
//!
//! - `resources` - Validate, persist and shape any [`Resource`](crate::models::Resource)
//! - `auth` - GitHub OAuth login, session state and the user upsert

pub mod auth;
pub mod resources;

pub use resources::{ResourceService, ServiceError};
