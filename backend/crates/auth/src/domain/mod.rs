//! Domain Layer
//!
//! Contains entities, value objects, read models and repository traits.

pub mod entity;
pub mod read_model;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{device_session::DeviceSession, user::User};
pub use repository::{DeviceSessionRepository, UserQueryRepository, UserRepository};
