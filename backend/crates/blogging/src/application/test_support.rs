//! Shared fixtures for application tests

use std::sync::Arc;

use chrono::{Duration, Utc};
use kernel::id::UserId;

use crate::application::blogs::BlogInput;
use crate::application::posts::PostInput;
use crate::domain::entity::blog::Blog;
use crate::domain::entity::post::Post;
use crate::domain::repository::{BlogRepository, PostRepository};
use crate::infra::memory::InMemoryBloggingStore;

pub(crate) const COMMENT_TEXT: &str = "a comment that is long enough to pass";

pub(crate) struct Fixture {
    pub store: Arc<InMemoryBloggingStore>,
}

pub(crate) fn fixture() -> Fixture {
    Fixture {
        store: Arc::new(InMemoryBloggingStore::new()),
    }
}

pub(crate) fn blog_input(name: &str) -> BlogInput {
    BlogInput {
        name: name.to_string(),
        description: format!("About {name}"),
        website_url: "https://example.com/blog".to_string(),
    }
}

pub(crate) fn post_input(title: &str) -> PostInput {
    PostInput {
        title: title.to_string(),
        short_description: format!("{title} in short"),
        content: format!("{title} in full"),
    }
}

impl Fixture {
    /// Blogs get strictly increasing creation times
    pub async fn blog(&self, name: &str) -> Blog {
        let Ok(content) = blog_input(name).validate() else {
            panic!("fixture blog input must be valid");
        };
        let created_at = Utc::now() + Duration::milliseconds(self.store.len() as i64);
        let blog = Blog::create(content, created_at);
        self.store.insert_blog(&blog).await.unwrap();
        blog
    }

    pub async fn post(&self, blog: &Blog, title: &str) -> Post {
        let input = post_input(title);
        let content = crate::domain::entity::post::PostContent {
            title: input.title,
            short_description: input.short_description,
            content: input.content,
        };
        let created_at = Utc::now() + Duration::milliseconds(self.store.len() as i64);
        let post = Post::create(blog.id, content, created_at);
        self.store.insert_post(&post).await.unwrap();
        post
    }

    pub fn user(&self, login: &str) -> UserId {
        let id = UserId::new();
        self.store.add_user(id, login);
        id
    }
}
