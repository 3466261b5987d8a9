//! Post Entity

use chrono::{DateTime, Utc};
use kernel::id::{BlogId, PostId};

/// Validated, editable fields of a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent {
    pub title: String,
    pub short_description: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub blog_id: BlogId,
    pub content: PostContent,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn create(blog_id: BlogId, content: PostContent, now: DateTime<Utc>) -> Self {
        Self {
            id: PostId::new(),
            blog_id,
            content,
            created_at: now,
        }
    }

    /// A post may be moved to another blog by the admin `PUT /posts/{id}`
    pub fn update(&mut self, blog_id: BlogId, content: PostContent) {
        self.blog_id = blog_id;
        self.content = content;
    }
}
