//! Read Models
//!
//! Response shapes produced by the query repositories.

use chrono::{DateTime, Utc};
use kernel::id::{BlogId, CommentId, PostId, UserId};
use serde::Serialize;

use crate::domain::value_object::like_status::LikeStatus;

/// Number of most recent likes embedded in a post view
pub const NEWEST_LIKES_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogView {
    pub id: BlogId,
    pub name: String,
    pub description: String,
    pub website_url: String,
    pub created_at: DateTime<Utc>,
    pub is_membership: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewestLike {
    pub added_at: DateTime<Utc>,
    pub user_id: UserId,
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedLikesInfo {
    pub likes_count: u64,
    pub dislikes_count: u64,
    pub my_status: LikeStatus,
    pub newest_likes: Vec<NewestLike>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: PostId,
    pub title: String,
    pub short_description: String,
    pub content: String,
    pub blog_id: BlogId,
    pub blog_name: String,
    pub created_at: DateTime<Utc>,
    pub extended_likes_info: ExtendedLikesInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentatorInfo {
    pub user_id: UserId,
    pub user_login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikesInfo {
    pub likes_count: u64,
    pub dislikes_count: u64,
    pub my_status: LikeStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: CommentId,
    pub content: String,
    pub commentator_info: CommentatorInfo,
    pub created_at: DateTime<Utc>,
    pub likes_info: LikesInfo,
}

/// Case-insensitive substring match on the blog name
#[derive(Debug, Clone, Default)]
pub struct BlogFilter {
    pub search_name_term: Option<String>,
}
