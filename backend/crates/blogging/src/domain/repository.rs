//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.
//! Method names are unique across traits so one store can implement all.

use chrono::{DateTime, Utc};
use kernel::id::{BlogId, CommentId, PostId, UserId};
use kernel::pagination::{Page, Paginated};

use crate::domain::entity::{blog::Blog, comment::Comment, post::Post};
use crate::domain::read_model::{BlogFilter, BlogView, CommentView, PostView};
use crate::domain::value_object::like_status::LikeStatus;
use crate::error::BlogResult;

#[trait_variant::make(BlogRepository: Send)]
pub trait LocalBlogRepository {
    async fn insert_blog(&self, blog: &Blog) -> BlogResult<()>;

    async fn find_blog(&self, blog_id: &BlogId) -> BlogResult<Option<Blog>>;

    async fn update_blog(&self, blog: &Blog) -> BlogResult<()>;

    /// Posts, comments and likes go with the blog. Returns `false` when no
    /// such blog existed.
    async fn delete_blog(&self, blog_id: &BlogId) -> BlogResult<bool>;
}

#[trait_variant::make(PostRepository: Send)]
pub trait LocalPostRepository {
    async fn insert_post(&self, post: &Post) -> BlogResult<()>;

    async fn find_post(&self, post_id: &PostId) -> BlogResult<Option<Post>>;

    async fn update_post(&self, post: &Post) -> BlogResult<()>;

    async fn delete_post(&self, post_id: &PostId) -> BlogResult<bool>;
}

#[trait_variant::make(CommentRepository: Send)]
pub trait LocalCommentRepository {
    async fn insert_comment(&self, comment: &Comment) -> BlogResult<()>;

    async fn find_comment(&self, comment_id: &CommentId) -> BlogResult<Option<Comment>>;

    async fn update_comment(&self, comment: &Comment) -> BlogResult<()>;

    async fn delete_comment(&self, comment_id: &CommentId) -> BlogResult<bool>;
}

/// Reactions, one row per user and target
#[trait_variant::make(LikeRepository: Send)]
pub trait LocalLikeRepository {
    /// Upsert the user's status. Setting the current status again changes
    /// nothing, so `addedAt` of an existing like is kept.
    async fn set_post_like(
        &self,
        post_id: &PostId,
        user_id: &UserId,
        status: LikeStatus,
        now: DateTime<Utc>,
    ) -> BlogResult<()>;

    async fn set_comment_like(
        &self,
        comment_id: &CommentId,
        user_id: &UserId,
        status: LikeStatus,
        now: DateTime<Utc>,
    ) -> BlogResult<()>;
}

/// Read access to accounts owned by the auth module
#[trait_variant::make(UserDirectory: Send)]
pub trait LocalUserDirectory {
    async fn find_user_login(&self, user_id: &UserId) -> BlogResult<Option<String>>;
}

/// Read side. `viewer` decides `myStatus`; `None` is anonymous.
#[trait_variant::make(BloggingQueryRepository: Send)]
pub trait LocalBloggingQueryRepository {
    async fn list_blogs(&self, filter: &BlogFilter, page: &Page)
    -> BlogResult<Paginated<BlogView>>;

    async fn find_blog_view(&self, blog_id: &BlogId) -> BlogResult<Option<BlogView>>;

    /// All posts, or only those of `blog_id`
    async fn list_posts(
        &self,
        blog_id: Option<&BlogId>,
        viewer: Option<&UserId>,
        page: &Page,
    ) -> BlogResult<Paginated<PostView>>;

    async fn find_post_view(
        &self,
        post_id: &PostId,
        viewer: Option<&UserId>,
    ) -> BlogResult<Option<PostView>>;

    async fn list_comments(
        &self,
        post_id: &PostId,
        viewer: Option<&UserId>,
        page: &Page,
    ) -> BlogResult<Paginated<CommentView>>;

    async fn find_comment_view(
        &self,
        comment_id: &CommentId,
        viewer: Option<&UserId>,
    ) -> BlogResult<Option<CommentView>>;
}
