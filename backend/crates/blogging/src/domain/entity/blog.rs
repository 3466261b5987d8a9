//! Blog Entity

use chrono::{DateTime, Utc};
use kernel::id::BlogId;

use crate::domain::value_object::website_url::WebsiteUrl;

/// Validated, editable fields of a blog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogContent {
    pub name: String,
    pub description: String,
    pub website_url: WebsiteUrl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blog {
    pub id: BlogId,
    pub content: BlogContent,
    pub created_at: DateTime<Utc>,
    pub is_membership: bool,
}

impl Blog {
    pub fn create(content: BlogContent, now: DateTime<Utc>) -> Self {
        Self {
            id: BlogId::new(),
            content,
            created_at: now,
            is_membership: false,
        }
    }

    pub fn update(&mut self, content: BlogContent) {
        self.content = content;
    }
}
