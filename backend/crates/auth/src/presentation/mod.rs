//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::{AuthAppState, AuthStore, Mailer};
pub use middleware::{
    AccessGuard, ClientMeta, CurrentUser, RateLimiter, Viewer, identify_bearer, rate_limit,
    require_basic_admin, require_bearer, require_refresh_session,
};
pub use router::{PgAuthState, auth_router, auth_router_generic};
