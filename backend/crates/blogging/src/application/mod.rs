//! Application Layer
//!
//! Command services validate input and apply changes; [`BloggingQueries`]
//! serves the read side.

pub mod blogs;
pub mod comments;
pub mod likes;
pub mod posts;
pub mod queries;

#[cfg(test)]
pub(crate) mod test_support;

pub use blogs::{BlogInput, BlogService};
pub use comments::CommentService;
pub use likes::LikeService;
pub use posts::{PostInput, PostService};
pub use queries::BloggingQueries;
