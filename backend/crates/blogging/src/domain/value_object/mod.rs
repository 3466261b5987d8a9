//! Value Objects

pub mod like_status;
pub mod text;
pub mod website_url;
