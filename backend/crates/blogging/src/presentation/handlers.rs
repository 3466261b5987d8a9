//! HTTP Handlers

use std::sync::Arc;

use auth::{AccessGuard, CurrentUser, Viewer};
use axum::Extension;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::extract::Json;
use kernel::pagination::{PageParams, Paginated};

use crate::application::{
    BlogService, BloggingQueries, CommentService, LikeService, PostInput, PostService,
};
use crate::domain::read_model::{BlogFilter, BlogView, CommentView, PostView};
use crate::domain::repository::{
    BlogRepository, BloggingQueryRepository, CommentRepository, LikeRepository, PostRepository,
    UserDirectory,
};
use crate::error::{BlogError, BlogResult};
use crate::presentation::dto::{
    BLOG_SORT_COLUMNS, BlogPostRequest, BlogRequest, BlogsQuery, COMMENT_SORT_COLUMNS,
    CommentRequest, LikeRequest, POST_SORT_COLUMNS, PostRequest,
};

/// Everything the blogging store must provide
pub trait BloggingStore:
    BlogRepository
    + PostRepository
    + CommentRepository
    + LikeRepository
    + UserDirectory
    + BloggingQueryRepository
    + Send
    + Sync
    + 'static
{
}

impl<T> BloggingStore for T where
    T: BlogRepository
        + PostRepository
        + CommentRepository
        + LikeRepository
        + UserDirectory
        + BloggingQueryRepository
        + Send
        + Sync
        + 'static
{
}

/// Shared state for blogging handlers
pub struct BloggingAppState<R>
where
    R: BloggingStore,
{
    pub repo: Arc<R>,
    pub guard: AccessGuard,
}

// Manual impl: `R` itself need not be Clone
impl<R> Clone for BloggingAppState<R>
where
    R: BloggingStore,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            guard: self.guard.clone(),
        }
    }
}

impl<R> BloggingAppState<R>
where
    R: BloggingStore,
{
    pub fn new(repo: R, guard: AccessGuard) -> Self {
        Self {
            repo: Arc::new(repo),
            guard,
        }
    }

    fn queries(&self) -> BloggingQueries<R> {
        BloggingQueries::new(self.repo.clone())
    }
}

/// Read back a freshly written row
fn created<T>(view: Option<T>) -> BlogResult<impl IntoResponse>
where
    T: serde::Serialize,
{
    let view = view.ok_or_else(|| BlogError::Internal("Created row not readable".into()))?;
    Ok((StatusCode::CREATED, axum::Json(view)))
}

// ============================================================================
// Blogs
// ============================================================================

/// GET /blogs, GET /sa/blogs
pub async fn list_blogs<R>(
    State(state): State<BloggingAppState<R>>,
    Query(query): Query<BlogsQuery>,
) -> BlogResult<axum::Json<Paginated<BlogView>>>
where
    R: BloggingStore,
{
    let page = query.page.resolve(BLOG_SORT_COLUMNS);
    let filter = BlogFilter {
        search_name_term: query.search_name_term.filter(|t| !t.is_empty()),
    };

    let blogs = state.queries().blogs(&filter, &page).await?;
    Ok(axum::Json(blogs))
}

/// GET /blogs/{id}
pub async fn get_blog<R>(
    State(state): State<BloggingAppState<R>>,
    Path(blog_id): Path<String>,
) -> BlogResult<axum::Json<BlogView>>
where
    R: BloggingStore,
{
    Ok(axum::Json(state.queries().blog(&blog_id).await?))
}

/// POST /sa/blogs
pub async fn create_blog<R>(
    State(state): State<BloggingAppState<R>>,
    Json(req): Json<BlogRequest>,
) -> BlogResult<impl IntoResponse>
where
    R: BloggingStore,
{
    let blog = BlogService::new(state.repo.clone()).create(req.into()).await?;
    created(state.repo.find_blog_view(&blog.id).await?)
}

/// PUT /sa/blogs/{id}
pub async fn update_blog<R>(
    State(state): State<BloggingAppState<R>>,
    Path(blog_id): Path<String>,
    Json(req): Json<BlogRequest>,
) -> BlogResult<StatusCode>
where
    R: BloggingStore,
{
    BlogService::new(state.repo.clone())
        .update(&blog_id, req.into())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /sa/blogs/{id}
pub async fn delete_blog<R>(
    State(state): State<BloggingAppState<R>>,
    Path(blog_id): Path<String>,
) -> BlogResult<StatusCode>
where
    R: BloggingStore,
{
    BlogService::new(state.repo.clone()).delete(&blog_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Posts of a blog
// ============================================================================

/// GET /blogs/{blogId}/posts, GET /sa/blogs/{blogId}/posts
pub async fn list_blog_posts<R>(
    State(state): State<BloggingAppState<R>>,
    Extension(viewer): Extension<Viewer>,
    Path(blog_id): Path<String>,
    Query(params): Query<PageParams>,
) -> BlogResult<axum::Json<Paginated<PostView>>>
where
    R: BloggingStore,
{
    let page = params.resolve(POST_SORT_COLUMNS);
    let posts = state
        .queries()
        .blog_posts(&blog_id, viewer.0.as_ref(), &page)
        .await?;
    Ok(axum::Json(posts))
}

/// POST /sa/blogs/{blogId}/posts
pub async fn create_blog_post<R>(
    State(state): State<BloggingAppState<R>>,
    Path(blog_id): Path<String>,
    Json(req): Json<BlogPostRequest>,
) -> BlogResult<impl IntoResponse>
where
    R: BloggingStore,
{
    let post = PostService::new(state.repo.clone())
        .create_in_blog(&blog_id, req.into())
        .await?;
    created(state.repo.find_post_view(&post.id, None).await?)
}

/// PUT /sa/blogs/{blogId}/posts/{postId}
pub async fn update_blog_post<R>(
    State(state): State<BloggingAppState<R>>,
    Path((blog_id, post_id)): Path<(String, String)>,
    Json(req): Json<BlogPostRequest>,
) -> BlogResult<StatusCode>
where
    R: BloggingStore,
{
    PostService::new(state.repo.clone())
        .update_in_blog(&blog_id, &post_id, req.into())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /sa/blogs/{blogId}/posts/{postId}
pub async fn delete_blog_post<R>(
    State(state): State<BloggingAppState<R>>,
    Path((blog_id, post_id)): Path<(String, String)>,
) -> BlogResult<StatusCode>
where
    R: BloggingStore,
{
    PostService::new(state.repo.clone())
        .delete_in_blog(&blog_id, &post_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Posts
// ============================================================================

/// GET /posts
pub async fn list_posts<R>(
    State(state): State<BloggingAppState<R>>,
    Extension(viewer): Extension<Viewer>,
    Query(params): Query<PageParams>,
) -> BlogResult<axum::Json<Paginated<PostView>>>
where
    R: BloggingStore,
{
    let page = params.resolve(POST_SORT_COLUMNS);
    let posts = state.queries().posts(viewer.0.as_ref(), &page).await?;
    Ok(axum::Json(posts))
}

/// GET /posts/{id}
pub async fn get_post<R>(
    State(state): State<BloggingAppState<R>>,
    Extension(viewer): Extension<Viewer>,
    Path(post_id): Path<String>,
) -> BlogResult<axum::Json<PostView>>
where
    R: BloggingStore,
{
    let post = state.queries().post(&post_id, viewer.0.as_ref()).await?;
    Ok(axum::Json(post))
}

/// POST /posts
pub async fn create_post<R>(
    State(state): State<BloggingAppState<R>>,
    Json(req): Json<PostRequest>,
) -> BlogResult<impl IntoResponse>
where
    R: BloggingStore,
{
    let post = PostService::new(state.repo.clone())
        .create(&req.blog_id, PostInput::from(req.post))
        .await?;
    created(state.repo.find_post_view(&post.id, None).await?)
}

/// PUT /posts/{id}
pub async fn update_post<R>(
    State(state): State<BloggingAppState<R>>,
    Path(post_id): Path<String>,
    Json(req): Json<PostRequest>,
) -> BlogResult<StatusCode>
where
    R: BloggingStore,
{
    PostService::new(state.repo.clone())
        .update(&post_id, &req.blog_id, req.post.into())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /posts/{id}
pub async fn delete_post<R>(
    State(state): State<BloggingAppState<R>>,
    Path(post_id): Path<String>,
) -> BlogResult<StatusCode>
where
    R: BloggingStore,
{
    PostService::new(state.repo.clone()).delete(&post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /posts/{postId}/like-status
pub async fn set_post_like_status<R>(
    State(state): State<BloggingAppState<R>>,
    Extension(current): Extension<CurrentUser>,
    Path(post_id): Path<String>,
    Json(req): Json<LikeRequest>,
) -> BlogResult<StatusCode>
where
    R: BloggingStore,
{
    LikeService::new(state.repo.clone())
        .react_to_post(&post_id, &current.user_id, &req.like_status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Comments
// ============================================================================

/// GET /posts/{postId}/comments
pub async fn list_post_comments<R>(
    State(state): State<BloggingAppState<R>>,
    Extension(viewer): Extension<Viewer>,
    Path(post_id): Path<String>,
    Query(params): Query<PageParams>,
) -> BlogResult<axum::Json<Paginated<CommentView>>>
where
    R: BloggingStore,
{
    let page = params.resolve(COMMENT_SORT_COLUMNS);
    let comments = state
        .queries()
        .post_comments(&post_id, viewer.0.as_ref(), &page)
        .await?;
    Ok(axum::Json(comments))
}

/// POST /posts/{postId}/comments
pub async fn create_comment<R>(
    State(state): State<BloggingAppState<R>>,
    Extension(current): Extension<CurrentUser>,
    Path(post_id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> BlogResult<impl IntoResponse>
where
    R: BloggingStore,
{
    let comment = CommentService::new(state.repo.clone())
        .create(&post_id, &current.user_id, &req.content)
        .await?;
    created(
        state
            .repo
            .find_comment_view(&comment.id, Some(&current.user_id))
            .await?,
    )
}

/// GET /comments/{id}
pub async fn get_comment<R>(
    State(state): State<BloggingAppState<R>>,
    Extension(viewer): Extension<Viewer>,
    Path(comment_id): Path<String>,
) -> BlogResult<axum::Json<CommentView>>
where
    R: BloggingStore,
{
    let comment = state
        .queries()
        .comment(&comment_id, viewer.0.as_ref())
        .await?;
    Ok(axum::Json(comment))
}

/// PUT /comments/{id}
pub async fn update_comment<R>(
    State(state): State<BloggingAppState<R>>,
    Extension(current): Extension<CurrentUser>,
    Path(comment_id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> BlogResult<StatusCode>
where
    R: BloggingStore,
{
    CommentService::new(state.repo.clone())
        .update(&comment_id, &current.user_id, &req.content)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /comments/{id}
pub async fn delete_comment<R>(
    State(state): State<BloggingAppState<R>>,
    Extension(current): Extension<CurrentUser>,
    Path(comment_id): Path<String>,
) -> BlogResult<StatusCode>
where
    R: BloggingStore,
{
    CommentService::new(state.repo.clone())
        .delete(&comment_id, &current.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /comments/{id}/like-status
pub async fn set_comment_like_status<R>(
    State(state): State<BloggingAppState<R>>,
    Extension(current): Extension<CurrentUser>,
    Path(comment_id): Path<String>,
    Json(req): Json<LikeRequest>,
) -> BlogResult<StatusCode>
where
    R: BloggingStore,
{
    LikeService::new(state.repo.clone())
        .react_to_comment(&comment_id, &current.user_id, &req.like_status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
