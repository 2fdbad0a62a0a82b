//! Middleware components for HTTP request processing.

pub mod auth;

pub use auth::require_user;
