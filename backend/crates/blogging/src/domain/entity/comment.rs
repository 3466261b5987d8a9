//! Comment Entity

use chrono::{DateTime, Utc};
use kernel::id::{CommentId, PostId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub content: String,
    pub commentator_id: UserId,
    /// Login at the time of writing
    pub commentator_login: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn create(
        post_id: PostId,
        commentator_id: UserId,
        commentator_login: String,
        content: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CommentId::new(),
            post_id,
            content,
            commentator_id,
            commentator_login,
            created_at: now,
        }
    }

    pub fn is_written_by(&self, user_id: &UserId) -> bool {
        &self.commentator_id == user_id
    }
}
