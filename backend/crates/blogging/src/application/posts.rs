//! Post Service
//!
//! Posts are addressed two ways: flat under `/posts` with the blog in the
//! body, or nested under `/sa/blogs/{blogId}/posts`. A missing blog is a
//! field error in the first case and a 404 in the second.

use std::sync::Arc;

use chrono::Utc;
use kernel::error::field::FieldErrors;
use kernel::id::{BlogId, PostId};

use crate::application::blogs::parse_blog_id;
use crate::domain::entity::post::{Post, PostContent};
use crate::domain::repository::{BlogRepository, PostRepository};
use crate::domain::value_object::text::{POST_CONTENT, POST_SHORT_DESCRIPTION, POST_TITLE};
use crate::error::{BlogError, BlogResult};

pub struct PostInput {
    pub title: String,
    pub short_description: String,
    pub content: String,
}

impl PostInput {
    fn check(self, errors: &mut FieldErrors) -> Option<PostContent> {
        let title = errors.check("title", POST_TITLE.apply(&self.title));
        let short_description = errors.check(
            "shortDescription",
            POST_SHORT_DESCRIPTION.apply(&self.short_description),
        );
        let content = errors.check("content", POST_CONTENT.apply(&self.content));

        let ((title, short_description), content) = title.zip(short_description).zip(content)?;
        Some(PostContent {
            title,
            short_description,
            content,
        })
    }
}

pub(crate) fn parse_post_id(raw: &str) -> BlogResult<PostId> {
    PostId::parse_str(raw).ok_or(BlogError::PostNotFound)
}

pub struct PostService<R>
where
    R: BlogRepository + PostRepository,
{
    repo: Arc<R>,
}

impl<R> PostService<R>
where
    R: BlogRepository + PostRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Validate the body and resolve `blogId` as a body field
    async fn validate_with_blog(
        &self,
        blog_id: &str,
        input: PostInput,
    ) -> BlogResult<(BlogId, PostContent)> {
        let mut errors = FieldErrors::new();
        let content = input.check(&mut errors);

        let blog_id = match BlogId::parse_str(blog_id) {
            Some(id) if self.repo.find_blog(&id).await?.is_some() => Some(id),
            _ => {
                errors.push("blogId", "Blog not found");
                None
            }
        };

        Ok(errors.finish(blog_id.zip(content))?)
    }

    fn validate(input: PostInput) -> BlogResult<PostContent> {
        let mut errors = FieldErrors::new();
        let content = input.check(&mut errors);
        Ok(errors.finish(content)?)
    }

    async fn require_blog(&self, blog_id: &str) -> BlogResult<BlogId> {
        let blog_id = parse_blog_id(blog_id)?;
        self.repo
            .find_blog(&blog_id)
            .await?
            .map(|blog| blog.id)
            .ok_or(BlogError::BlogNotFound)
    }

    /// Post of `blog_id`, or 404 if it lives elsewhere
    async fn require_post_in(&self, blog_id: &BlogId, post_id: &str) -> BlogResult<Post> {
        let post_id = parse_post_id(post_id)?;
        self.repo
            .find_post(&post_id)
            .await?
            .filter(|post| &post.blog_id == blog_id)
            .ok_or(BlogError::PostNotFound)
    }

    async fn persist_new(&self, blog_id: BlogId, content: PostContent) -> BlogResult<Post> {
        let post = Post::create(blog_id, content, Utc::now());
        self.repo.insert_post(&post).await?;

        tracing::info!(post_id = %post.id, blog_id = %post.blog_id, "Post created");
        Ok(post)
    }

    /// `POST /posts`
    pub async fn create(&self, blog_id: &str, input: PostInput) -> BlogResult<Post> {
        let (blog_id, content) = self.validate_with_blog(blog_id, input).await?;
        self.persist_new(blog_id, content).await
    }

    /// `POST /sa/blogs/{blogId}/posts`
    pub async fn create_in_blog(&self, blog_id: &str, input: PostInput) -> BlogResult<Post> {
        let content = Self::validate(input)?;
        let blog_id = self.require_blog(blog_id).await?;
        self.persist_new(blog_id, content).await
    }

    /// `PUT /posts/{id}`
    pub async fn update(&self, post_id: &str, blog_id: &str, input: PostInput) -> BlogResult<()> {
        let (blog_id, content) = self.validate_with_blog(blog_id, input).await?;
        let post_id = parse_post_id(post_id)?;

        let mut post = self
            .repo
            .find_post(&post_id)
            .await?
            .ok_or(BlogError::PostNotFound)?;
        post.update(blog_id, content);
        self.repo.update_post(&post).await?;

        tracing::info!(post_id = %post.id, "Post updated");
        Ok(())
    }

    /// `PUT /sa/blogs/{blogId}/posts/{postId}`
    pub async fn update_in_blog(
        &self,
        blog_id: &str,
        post_id: &str,
        input: PostInput,
    ) -> BlogResult<()> {
        let content = Self::validate(input)?;
        let blog_id = self.require_blog(blog_id).await?;
        let mut post = self.require_post_in(&blog_id, post_id).await?;

        post.update(blog_id, content);
        self.repo.update_post(&post).await?;

        tracing::info!(post_id = %post.id, "Post updated");
        Ok(())
    }

    /// `DELETE /posts/{id}`
    pub async fn delete(&self, post_id: &str) -> BlogResult<()> {
        let post_id = parse_post_id(post_id)?;

        if !self.repo.delete_post(&post_id).await? {
            return Err(BlogError::PostNotFound);
        }

        tracing::info!(post_id = %post_id, "Post deleted");
        Ok(())
    }

    /// `DELETE /sa/blogs/{blogId}/posts/{postId}`
    pub async fn delete_in_blog(&self, blog_id: &str, post_id: &str) -> BlogResult<()> {
        let blog_id = self.require_blog(blog_id).await?;
        let post = self.require_post_in(&blog_id, post_id).await?;

        self.repo.delete_post(&post.id).await?;

        tracing::info!(post_id = %post.id, "Post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{fixture, post_input};

    fn fields_of(err: BlogError) -> Vec<String> {
        err.into_app_error()
            .into_field_errors()
            .into_iter()
            .map(|e| e.field)
            .collect()
    }

    #[tokio::test]
    async fn test_create_via_posts_checks_blog_as_field() {
        let fx = fixture();
        let service = PostService::new(fx.store.clone());

        let err = service
            .create(&BlogId::new().to_string(), post_input("Hello"))
            .await
            .unwrap_err();
        assert_eq!(fields_of(err), vec!["blogId"]);

        let err = service
            .create("garbage", PostInput {
                title: "".into(),
                short_description: "short".into(),
                content: "content".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(fields_of(err), vec!["title", "blogId"]);

        let blog = fx.blog("Rust").await;
        let post = service
            .create(&blog.id.to_string(), post_input("Hello"))
            .await
            .unwrap();
        assert_eq!(post.blog_id, blog.id);
    }

    #[tokio::test]
    async fn test_nested_routes_use_not_found() {
        let fx = fixture();
        let service = PostService::new(fx.store.clone());

        assert!(matches!(
            service
                .create_in_blog(&BlogId::new().to_string(), post_input("Hello"))
                .await,
            Err(BlogError::BlogNotFound)
        ));

        let blog = fx.blog("Rust").await;
        let other = fx.blog("Go").await;
        let post = service
            .create_in_blog(&blog.id.to_string(), post_input("Hello"))
            .await
            .unwrap();

        // a post is only reachable through its own blog
        assert!(matches!(
            service
                .update_in_blog(&other.id.to_string(), &post.id.to_string(), post_input("Moved"))
                .await,
            Err(BlogError::PostNotFound)
        ));
        assert!(matches!(
            service
                .delete_in_blog(&other.id.to_string(), &post.id.to_string())
                .await,
            Err(BlogError::PostNotFound)
        ));

        service
            .update_in_blog(&blog.id.to_string(), &post.id.to_string(), post_input("Edited"))
            .await
            .unwrap();
        let stored = fx.store.find_post(&post.id).await.unwrap().unwrap();
        assert_eq!(stored.content.title, "Edited");

        service
            .delete_in_blog(&blog.id.to_string(), &post.id.to_string())
            .await
            .unwrap();
        assert!(fx.store.find_post(&post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_can_move_post() {
        let fx = fixture();
        let service = PostService::new(fx.store.clone());
        let blog = fx.blog("Rust").await;
        let other = fx.blog("Go").await;
        let post = fx.post(&blog, "Hello").await;

        service
            .update(&post.id.to_string(), &other.id.to_string(), post_input("Hello"))
            .await
            .unwrap();
        let stored = fx.store.find_post(&post.id).await.unwrap().unwrap();
        assert_eq!(stored.blog_id, other.id);

        assert!(matches!(
            service
                .update(&PostId::new().to_string(), &other.id.to_string(), post_input("x"))
                .await,
            Err(BlogError::PostNotFound)
        ));
        assert!(matches!(service.delete("nope").await, Err(BlogError::PostNotFound)));
    }
}
