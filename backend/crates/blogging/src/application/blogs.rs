//! Blog Service

use std::sync::Arc;

use chrono::Utc;
use kernel::error::field::FieldErrors;
use kernel::id::BlogId;

use crate::domain::entity::blog::{Blog, BlogContent};
use crate::domain::repository::BlogRepository;
use crate::domain::value_object::text::{BLOG_DESCRIPTION, BLOG_NAME};
use crate::domain::value_object::website_url::WebsiteUrl;
use crate::error::{BlogError, BlogResult};

pub struct BlogInput {
    pub name: String,
    pub description: String,
    pub website_url: String,
}

impl BlogInput {
    pub(crate) fn validate(self) -> BlogResult<BlogContent> {
        let mut errors = FieldErrors::new();
        let name = errors.check("name", BLOG_NAME.apply(&self.name));
        let description = errors.check("description", BLOG_DESCRIPTION.apply(&self.description));
        let website_url = errors.check("websiteUrl", WebsiteUrl::new(self.website_url));

        let ((name, description), website_url) =
            errors.finish(name.zip(description).zip(website_url))?;
        Ok(BlogContent {
            name,
            description,
            website_url,
        })
    }
}

/// Path ids that are not UUIDs address nothing
pub(crate) fn parse_blog_id(raw: &str) -> BlogResult<BlogId> {
    BlogId::parse_str(raw).ok_or(BlogError::BlogNotFound)
}

pub struct BlogService<R>
where
    R: BlogRepository,
{
    repo: Arc<R>,
}

impl<R> BlogService<R>
where
    R: BlogRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, input: BlogInput) -> BlogResult<Blog> {
        let blog = Blog::create(input.validate()?, Utc::now());
        self.repo.insert_blog(&blog).await?;

        tracing::info!(blog_id = %blog.id, name = %blog.content.name, "Blog created");
        Ok(blog)
    }

    pub async fn update(&self, blog_id: &str, input: BlogInput) -> BlogResult<()> {
        let content = input.validate()?;
        let blog_id = parse_blog_id(blog_id)?;

        let mut blog = self
            .repo
            .find_blog(&blog_id)
            .await?
            .ok_or(BlogError::BlogNotFound)?;
        blog.update(content);
        self.repo.update_blog(&blog).await?;

        tracing::info!(blog_id = %blog.id, "Blog updated");
        Ok(())
    }

    pub async fn delete(&self, blog_id: &str) -> BlogResult<()> {
        let blog_id = parse_blog_id(blog_id)?;

        if !self.repo.delete_blog(&blog_id).await? {
            return Err(BlogError::BlogNotFound);
        }

        tracing::info!(blog_id = %blog_id, "Blog deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{blog_input, fixture};

    #[tokio::test]
    async fn test_create_update_delete() {
        let fx = fixture();
        let service = BlogService::new(fx.store.clone());

        let blog = service.create(blog_input("Rust")).await.unwrap();
        assert!(!blog.is_membership);

        service
            .update(&blog.id.to_string(), blog_input("Rust 2024"))
            .await
            .unwrap();
        let stored = fx.store.find_blog(&blog.id).await.unwrap().unwrap();
        assert_eq!(stored.content.name, "Rust 2024");

        service.delete(&blog.id.to_string()).await.unwrap();
        assert!(matches!(
            service.delete(&blog.id.to_string()).await,
            Err(BlogError::BlogNotFound)
        ));
    }

    #[tokio::test]
    async fn test_validation_reports_every_field() {
        let fx = fixture();
        let service = BlogService::new(fx.store.clone());

        let err = service
            .create(BlogInput {
                name: "".into(),
                description: "ok".into(),
                website_url: "http://insecure.com".into(),
            })
            .await
            .unwrap_err();
        let fields: Vec<_> = err
            .into_app_error()
            .into_field_errors()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["name", "websiteUrl"]);
    }

    #[tokio::test]
    async fn test_update_unknown_blog() {
        let fx = fixture();
        let service = BlogService::new(fx.store.clone());
        assert!(matches!(
            service.update("nope", blog_input("Rust")).await,
            Err(BlogError::BlogNotFound)
        ));
    }
}
