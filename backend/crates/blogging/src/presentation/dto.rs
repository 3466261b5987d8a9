//! API DTOs (Data Transfer Objects)
//!
//! Missing string fields deserialize as empty and fail field validation.

use kernel::pagination::PageParams;
use serde::Deserialize;

use crate::application::{BlogInput, PostInput};

/// `(sortBy, column)` allow-lists; the first entry is the default
pub const BLOG_SORT_COLUMNS: &[(&str, &str)] = &[
    ("createdAt", "created_at"),
    ("name", "name"),
    ("description", "description"),
    ("websiteUrl", "website_url"),
    ("isMembership", "is_membership"),
];

pub const POST_SORT_COLUMNS: &[(&str, &str)] = &[
    ("createdAt", "created_at"),
    ("title", "title"),
    ("shortDescription", "short_description"),
    ("content", "content"),
    ("blogId", "blog_id"),
    ("blogName", "blog_name"),
];

pub const COMMENT_SORT_COLUMNS: &[(&str, &str)] =
    &[("createdAt", "created_at"), ("content", "content")];

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website_url: String,
}

impl From<BlogRequest> for BlogInput {
    fn from(req: BlogRequest) -> Self {
        BlogInput {
            name: req.name,
            description: req.description,
            website_url: req.website_url,
        }
    }
}

/// Body of `/sa/blogs/{blogId}/posts`; the blog comes from the path
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub content: String,
}

impl From<BlogPostRequest> for PostInput {
    fn from(req: BlogPostRequest) -> Self {
        PostInput {
            title: req.title,
            short_description: req.short_description,
            content: req.content,
        }
    }
}

/// Body of `/posts`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    #[serde(flatten)]
    pub post: BlogPostRequest,
    #[serde(default)]
    pub blog_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    #[serde(default)]
    pub like_status: String,
}

// ============================================================================
// Queries
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogsQuery {
    pub search_name_term: Option<String>,
    #[serde(flatten)]
    pub page: PageParams,
}
