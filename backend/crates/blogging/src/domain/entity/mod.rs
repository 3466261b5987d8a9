//! Domain Entities

pub mod blog;
pub mod comment;
pub mod post;
