//! Domain Layer
//!
//! Entities, value objects, read models and repository traits.

pub mod entity;
pub mod read_model;
pub mod repository;
pub mod value_object;

pub use entity::{blog::Blog, comment::Comment, post::Post};
pub use repository::{
    BlogRepository, BloggingQueryRepository, CommentRepository, LikeRepository, PostRepository,
    UserDirectory,
};
