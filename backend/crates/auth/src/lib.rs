//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Login by login or email with password
//! - Short-lived access JWT in the body, refresh JWT in an HttpOnly cookie
//! - One device session per refresh-token lineage, rotated on every refresh
//! - Registration with email confirmation, password recovery
//! - Admin user management behind HTTP Basic
//!
//! ## Security Model
//! - Passwords hashed with Argon2id
//! - Refresh tokens are valid only while their `iat` matches the session
//! - Login, registration and recovery endpoints are rate limited
//!
//! Other crates reuse the guards: [`require_bearer`], [`identify_bearer`] and
//! [`require_basic_admin`] take an [`AccessGuard`] as state.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{AdminCredentials, AuthConfig};
pub use application::email::LoggingEmailSender;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthRepository;
pub use presentation::middleware::{
    AccessGuard, CurrentUser, Viewer, identify_bearer, require_basic_admin, require_bearer,
};
pub use presentation::router::{PgAuthState, auth_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
