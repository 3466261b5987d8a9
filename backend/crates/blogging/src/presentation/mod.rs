//! Presentation Layer

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::{BloggingAppState, BloggingStore};
pub use router::{PgBloggingState, blogging_router, blogging_router_generic};
