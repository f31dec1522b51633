//! Eko Store Core - Shared domain types.
//!
//! This crate provides the value types used across the Eko Store components:
//! - `api` - The REST API server (products, customers, reviews, GitHub login)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Every constructor validates its input, so a value of one
//! of these types is always well-formed.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for document IDs, prices, emails, and phone numbers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
