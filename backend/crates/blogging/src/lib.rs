//! Blogging Backend Module
//!
//! Blogs, their posts, comments on posts and like/dislike reactions on
//! both. Layered like the auth module:
//! - `domain/` - entities, value objects, read models, repository traits
//! - `application/` - command services and the read-side service
//! - `infra/` - PostgreSQL repository
//! - `presentation/` - DTOs, handlers, router
//!
//! Authentication is delegated to the guards of the `auth` crate.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

pub use error::{BlogError, BlogResult};
pub use infra::postgres::PgBloggingRepository;
pub use presentation::{BloggingAppState, PgBloggingState, blogging_router};
