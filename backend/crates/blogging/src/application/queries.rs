//! Read-side service
//!
//! Resolves path ids and answers 404 for absent parents before delegating
//! to the query repository.

use std::sync::Arc;

use kernel::id::UserId;
use kernel::pagination::{Page, Paginated};

use crate::application::blogs::parse_blog_id;
use crate::application::comments::parse_comment_id;
use crate::application::posts::parse_post_id;
use crate::domain::read_model::{BlogFilter, BlogView, CommentView, PostView};
use crate::domain::repository::BloggingQueryRepository;
use crate::error::{BlogError, BlogResult};

pub struct BloggingQueries<R>
where
    R: BloggingQueryRepository,
{
    repo: Arc<R>,
}

impl<R> BloggingQueries<R>
where
    R: BloggingQueryRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn blogs(&self, filter: &BlogFilter, page: &Page) -> BlogResult<Paginated<BlogView>> {
        self.repo.list_blogs(filter, page).await
    }

    pub async fn blog(&self, blog_id: &str) -> BlogResult<BlogView> {
        let blog_id = parse_blog_id(blog_id)?;
        self.repo
            .find_blog_view(&blog_id)
            .await?
            .ok_or(BlogError::BlogNotFound)
    }

    pub async fn posts(&self, viewer: Option<&UserId>, page: &Page) -> BlogResult<Paginated<PostView>> {
        self.repo.list_posts(None, viewer, page).await
    }

    pub async fn blog_posts(
        &self,
        blog_id: &str,
        viewer: Option<&UserId>,
        page: &Page,
    ) -> BlogResult<Paginated<PostView>> {
        let blog_id = parse_blog_id(blog_id)?;
        if self.repo.find_blog_view(&blog_id).await?.is_none() {
            return Err(BlogError::BlogNotFound);
        }
        self.repo.list_posts(Some(&blog_id), viewer, page).await
    }

    pub async fn post(&self, post_id: &str, viewer: Option<&UserId>) -> BlogResult<PostView> {
        let post_id = parse_post_id(post_id)?;
        self.repo
            .find_post_view(&post_id, viewer)
            .await?
            .ok_or(BlogError::PostNotFound)
    }

    pub async fn post_comments(
        &self,
        post_id: &str,
        viewer: Option<&UserId>,
        page: &Page,
    ) -> BlogResult<Paginated<CommentView>> {
        let post_id = parse_post_id(post_id)?;
        if self.repo.find_post_view(&post_id, None).await?.is_none() {
            return Err(BlogError::PostNotFound);
        }
        self.repo.list_comments(&post_id, viewer, page).await
    }

    pub async fn comment(&self, comment_id: &str, viewer: Option<&UserId>) -> BlogResult<CommentView> {
        let comment_id = parse_comment_id(comment_id)?;
        self.repo
            .find_comment_view(&comment_id, viewer)
            .await?
            .ok_or(BlogError::CommentNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::fixture;
    use kernel::pagination::PageParams;

    const BLOG_COLUMNS: &[(&str, &str)] = &[("createdAt", "created_at"), ("name", "name")];

    #[tokio::test]
    async fn test_blog_list_filters_and_pages() {
        let fx = fixture();
        let queries = BloggingQueries::new(fx.store.clone());
        for name in ["Rust", "rusty", "Go"] {
            fx.blog(name).await;
        }

        let page = PageParams {
            page_size: Some("1".into()),
            sort_by: Some("name".into()),
            sort_direction: Some("asc".into()),
            ..Default::default()
        }
        .resolve(BLOG_COLUMNS);
        let filter = BlogFilter {
            search_name_term: Some("RUST".into()),
        };

        let listed = queries.blogs(&filter, &page).await.unwrap();
        assert_eq!(listed.total_count, 2);
        assert_eq!(listed.pages_count, 2);
        assert_eq!(listed.items.len(), 1);
        assert_eq!(listed.items[0].name, "Rust");
    }

    #[tokio::test]
    async fn test_missing_parents_are_not_found() {
        let fx = fixture();
        let queries = BloggingQueries::new(fx.store.clone());
        let page = PageParams::default().resolve(BLOG_COLUMNS);

        assert!(matches!(
            queries.blog_posts(&kernel::id::BlogId::new().to_string(), None, &page).await,
            Err(BlogError::BlogNotFound)
        ));
        assert!(matches!(
            queries.post_comments("not-a-uuid", None, &page).await,
            Err(BlogError::PostNotFound)
        ));
        assert!(matches!(queries.comment("x", None).await, Err(BlogError::CommentNotFound)));
    }

    #[tokio::test]
    async fn test_blog_posts_are_scoped() {
        let fx = fixture();
        let queries = BloggingQueries::new(fx.store.clone());
        let rust = fx.blog("Rust").await;
        let go = fx.blog("Go").await;
        fx.post(&rust, "One").await;
        fx.post(&rust, "Two").await;
        fx.post(&go, "Three").await;

        let page = PageParams::default().resolve(&[("createdAt", "created_at")]);
        let listed = queries
            .blog_posts(&rust.id.to_string(), None, &page)
            .await
            .unwrap();
        assert_eq!(listed.total_count, 2);
        assert!(listed.items.iter().all(|p| p.blog_name == "Rust"));

        let all = queries.posts(None, &page).await.unwrap();
        assert_eq!(all.total_count, 3);
        // newest first by default
        assert_eq!(all.items[0].title, "Three");
    }
}
