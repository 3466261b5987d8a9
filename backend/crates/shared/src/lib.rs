//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of domain vocabulary:
//! - Common error types and result aliases
//! - Field-level validation errors
//! - Common primitive value objects (ID types, etc.)
//! - Pagination envelope shared by every list endpoint
//! - Problem-details aware request extractors (feature `axum`)
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod field;
    pub mod kind;
}
#[cfg(feature = "axum")]
pub mod extract;
pub mod id;
pub mod pagination;
#[cfg(all(feature = "sqlx", any(test, feature = "test-util")))]
pub mod testing;
