//! PostgreSQL Repository Implementations
//!
//! Like counters are not stored; every view counts `post_likes` /
//! `comment_likes` rows, so reactions removed by a user deletion are
//! reflected immediately.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use kernel::id::{BlogId, CommentId, PostId, UserId};
use kernel::pagination::{Page, Paginated};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    blog::{Blog, BlogContent},
    comment::Comment,
    post::{Post, PostContent},
};
use crate::domain::read_model::{
    BlogFilter, BlogView, CommentView, CommentatorInfo, ExtendedLikesInfo, LikesInfo,
    NEWEST_LIKES_LIMIT, NewestLike, PostView,
};
use crate::domain::repository::{
    BlogRepository, BloggingQueryRepository, CommentRepository, LikeRepository, PostRepository,
    UserDirectory,
};
use crate::domain::value_object::{like_status::LikeStatus, website_url::WebsiteUrl};
use crate::error::BlogResult;

/// Post rows with blog name, counters and the viewer's status (`$1`)
const POST_VIEWS: &str = r#"
    SELECT
        p.id,
        p.title,
        p.short_description,
        p.content,
        p.blog_id,
        b.name AS blog_name,
        p.created_at,
        (SELECT COUNT(*) FROM post_likes l WHERE l.post_id = p.id AND l.status = 'Like') AS likes_count,
        (SELECT COUNT(*) FROM post_likes l WHERE l.post_id = p.id AND l.status = 'Dislike') AS dislikes_count,
        COALESCE(
            (SELECT l.status FROM post_likes l WHERE l.post_id = p.id AND l.user_id = $1),
            'None'
        ) AS my_status
    FROM posts p
    JOIN blogs b ON b.id = p.blog_id
"#;

/// Comment rows with counters and the viewer's status (`$1`)
const COMMENT_VIEWS: &str = r#"
    SELECT
        c.id,
        c.post_id,
        c.content,
        c.commentator_id,
        c.commentator_login,
        c.created_at,
        (SELECT COUNT(*) FROM comment_likes l WHERE l.comment_id = c.id AND l.status = 'Like') AS likes_count,
        (SELECT COUNT(*) FROM comment_likes l WHERE l.comment_id = c.id AND l.status = 'Dislike') AS dislikes_count,
        COALESCE(
            (SELECT l.status FROM comment_likes l WHERE l.comment_id = c.id AND l.user_id = $1),
            'None'
        ) AS my_status
    FROM comments c
"#;

/// PostgreSQL-backed blogging repository
#[derive(Clone)]
pub struct PgBloggingRepository {
    pool: PgPool,
}

impl PgBloggingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Latest likes per post, newest first
    async fn newest_likes(&self, post_ids: &[Uuid]) -> BlogResult<HashMap<Uuid, Vec<NewestLike>>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, NewestLikeRow>(
            r#"
            SELECT post_id, user_id, login, added_at
            FROM (
                SELECT
                    l.post_id,
                    l.user_id,
                    u.login,
                    l.updated_at AS added_at,
                    ROW_NUMBER() OVER (PARTITION BY l.post_id ORDER BY l.updated_at DESC) AS rn
                FROM post_likes l
                JOIN users u ON u.id = l.user_id
                WHERE l.post_id = ANY($1) AND l.status = 'Like'
            ) ranked
            WHERE rn <= $2
            ORDER BY post_id, added_at DESC
            "#,
        )
        .bind(post_ids)
        .bind(NEWEST_LIKES_LIMIT as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut by_post: HashMap<Uuid, Vec<NewestLike>> = HashMap::new();
        for row in rows {
            by_post.entry(row.post_id).or_default().push(NewestLike {
                added_at: row.added_at,
                user_id: UserId::from_uuid(row.user_id),
                login: row.login,
            });
        }
        Ok(by_post)
    }

    async fn into_post_views(&self, rows: Vec<PostViewRow>) -> BlogResult<Vec<PostView>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut newest = self.newest_likes(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let likes = newest.remove(&row.id).unwrap_or_default();
                row.into_view(likes)
            })
            .collect())
    }
}

/// `%term%` with LIKE wildcards escaped
fn contains_pattern(term: &Option<String>) -> Option<String> {
    term.as_deref().map(|t| {
        let escaped = t
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{}%", escaped)
    })
}

fn viewer_uuid(viewer: Option<&UserId>) -> Option<Uuid> {
    viewer.map(|id| *id.as_uuid())
}

fn count(value: i64) -> u64 {
    value.max(0) as u64
}

// ============================================================================
// Blog Repository Implementation
// ============================================================================

impl BlogRepository for PgBloggingRepository {
    async fn insert_blog(&self, blog: &Blog) -> BlogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO blogs (id, name, description, website_url, created_at, is_membership)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(blog.id.as_uuid())
        .bind(&blog.content.name)
        .bind(&blog.content.description)
        .bind(blog.content.website_url.as_str())
        .bind(blog.created_at)
        .bind(blog.is_membership)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_blog(&self, blog_id: &BlogId) -> BlogResult<Option<Blog>> {
        let row = sqlx::query_as::<_, BlogRow>(
            r#"
            SELECT id, name, description, website_url, created_at, is_membership
            FROM blogs
            WHERE id = $1
            "#,
        )
        .bind(blog_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(BlogRow::into_blog))
    }

    async fn update_blog(&self, blog: &Blog) -> BlogResult<()> {
        sqlx::query(
            r#"
            UPDATE blogs
            SET name = $2, description = $3, website_url = $4
            WHERE id = $1
            "#,
        )
        .bind(blog.id.as_uuid())
        .bind(&blog.content.name)
        .bind(&blog.content.description)
        .bind(blog.content.website_url.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_blog(&self, blog_id: &BlogId) -> BlogResult<bool> {
        // posts, comments and likes cascade
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(blog_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Post Repository Implementation
// ============================================================================

impl PostRepository for PgBloggingRepository {
    async fn insert_post(&self, post: &Post) -> BlogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, blog_id, title, short_description, content, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(post.id.as_uuid())
        .bind(post.blog_id.as_uuid())
        .bind(&post.content.title)
        .bind(&post.content.short_description)
        .bind(&post.content.content)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_post(&self, post_id: &PostId) -> BlogResult<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, blog_id, title, short_description, content, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PostRow::into_post))
    }

    async fn update_post(&self, post: &Post) -> BlogResult<()> {
        sqlx::query(
            r#"
            UPDATE posts
            SET blog_id = $2, title = $3, short_description = $4, content = $5
            WHERE id = $1
            "#,
        )
        .bind(post.id.as_uuid())
        .bind(post.blog_id.as_uuid())
        .bind(&post.content.title)
        .bind(&post.content.short_description)
        .bind(&post.content.content)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_post(&self, post_id: &PostId) -> BlogResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Comment Repository Implementation
// ============================================================================

impl CommentRepository for PgBloggingRepository {
    async fn insert_comment(&self, comment: &Comment) -> BlogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (
                id,
                post_id,
                content,
                commentator_id,
                commentator_login,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(comment.id.as_uuid())
        .bind(comment.post_id.as_uuid())
        .bind(&comment.content)
        .bind(comment.commentator_id.as_uuid())
        .bind(&comment.commentator_login)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_comment(&self, comment_id: &CommentId) -> BlogResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, post_id, content, commentator_id, commentator_login, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CommentRow::into_comment))
    }

    async fn update_comment(&self, comment: &Comment) -> BlogResult<()> {
        sqlx::query("UPDATE comments SET content = $2 WHERE id = $1")
            .bind(comment.id.as_uuid())
            .bind(&comment.content)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_comment(&self, comment_id: &CommentId) -> BlogResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Like Repository Implementation
// ============================================================================

impl LikeRepository for PgBloggingRepository {
    async fn set_post_like(
        &self,
        post_id: &PostId,
        user_id: &UserId,
        status: LikeStatus,
        now: DateTime<Utc>,
    ) -> BlogResult<()> {
        // unchanged status keeps the original timestamp
        sqlx::query(
            r#"
            INSERT INTO post_likes (post_id, user_id, status, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (post_id, user_id) DO UPDATE
            SET status = EXCLUDED.status, updated_at = EXCLUDED.updated_at
            WHERE post_likes.status <> EXCLUDED.status
            "#,
        )
        .bind(post_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(status.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_comment_like(
        &self,
        comment_id: &CommentId,
        user_id: &UserId,
        status: LikeStatus,
        now: DateTime<Utc>,
    ) -> BlogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO comment_likes (comment_id, user_id, status, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (comment_id, user_id) DO UPDATE
            SET status = EXCLUDED.status, updated_at = EXCLUDED.updated_at
            WHERE comment_likes.status <> EXCLUDED.status
            "#,
        )
        .bind(comment_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(status.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl UserDirectory for PgBloggingRepository {
    async fn find_user_login(&self, user_id: &UserId) -> BlogResult<Option<String>> {
        let login = sqlx::query_scalar("SELECT login FROM users WHERE id = $1")
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(login)
    }
}

// ============================================================================
// Query Repository Implementation
// ============================================================================

impl BloggingQueryRepository for PgBloggingRepository {
    async fn list_blogs(&self, filter: &BlogFilter, page: &Page) -> BlogResult<Paginated<BlogView>> {
        let condition = "$1::text IS NULL OR name ILIKE $1";
        let pattern = contains_pattern(&filter.search_name_term);

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM blogs WHERE {condition}"))
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        // sort_column comes from a fixed allow-list
        let sql = format!(
            r#"
            SELECT id, name, description, website_url, created_at, is_membership
            FROM blogs
            WHERE {condition}
            ORDER BY {} {}, id
            LIMIT $2 OFFSET $3
            "#,
            page.sort_column,
            page.direction.as_sql()
        );
        let rows = sqlx::query_as::<_, BlogRow>(&sql)
            .bind(&pattern)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows.into_iter().map(BlogRow::into_view).collect();
        Ok(Paginated::new(items, count(total), page))
    }

    async fn find_blog_view(&self, blog_id: &BlogId) -> BlogResult<Option<BlogView>> {
        let row = sqlx::query_as::<_, BlogRow>(
            r#"
            SELECT id, name, description, website_url, created_at, is_membership
            FROM blogs
            WHERE id = $1
            "#,
        )
        .bind(blog_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(BlogRow::into_view))
    }

    async fn list_posts(
        &self,
        blog_id: Option<&BlogId>,
        viewer: Option<&UserId>,
        page: &Page,
    ) -> BlogResult<Paginated<PostView>> {
        let blog_uuid = blog_id.map(|id| *id.as_uuid());

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE $1::uuid IS NULL OR blog_id = $1")
                .bind(blog_uuid)
                .fetch_one(&self.pool)
                .await?;

        // sort_column names a column of the view; it comes from a fixed allow-list
        let sql = format!(
            r#"
            SELECT * FROM ({POST_VIEWS}) v
            WHERE $2::uuid IS NULL OR v.blog_id = $2
            ORDER BY {} {}, id
            LIMIT $3 OFFSET $4
            "#,
            page.sort_column,
            page.direction.as_sql()
        );
        let rows = sqlx::query_as::<_, PostViewRow>(&sql)
            .bind(viewer_uuid(viewer))
            .bind(blog_uuid)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = self.into_post_views(rows).await?;
        Ok(Paginated::new(items, count(total), page))
    }

    async fn find_post_view(
        &self,
        post_id: &PostId,
        viewer: Option<&UserId>,
    ) -> BlogResult<Option<PostView>> {
        let sql = format!("{POST_VIEWS} WHERE p.id = $2");
        let row = sqlx::query_as::<_, PostViewRow>(&sql)
            .bind(viewer_uuid(viewer))
            .bind(post_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.into_post_views(vec![row]).await?.pop())
    }

    async fn list_comments(
        &self,
        post_id: &PostId,
        viewer: Option<&UserId>,
        page: &Page,
    ) -> BlogResult<Paginated<CommentView>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE post_id = $1")
            .bind(post_id.as_uuid())
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            r#"
            SELECT * FROM ({COMMENT_VIEWS}) v
            WHERE v.post_id = $2
            ORDER BY {} {}, id
            LIMIT $3 OFFSET $4
            "#,
            page.sort_column,
            page.direction.as_sql()
        );
        let rows = sqlx::query_as::<_, CommentViewRow>(&sql)
            .bind(viewer_uuid(viewer))
            .bind(post_id.as_uuid())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows.into_iter().map(CommentViewRow::into_view).collect();
        Ok(Paginated::new(items, count(total), page))
    }

    async fn find_comment_view(
        &self,
        comment_id: &CommentId,
        viewer: Option<&UserId>,
    ) -> BlogResult<Option<CommentView>> {
        let sql = format!("{COMMENT_VIEWS} WHERE c.id = $2");
        let row = sqlx::query_as::<_, CommentViewRow>(&sql)
            .bind(viewer_uuid(viewer))
            .bind(comment_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(CommentViewRow::into_view))
    }
}

// ============================================================================
// Database Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct BlogRow {
    id: Uuid,
    name: String,
    description: String,
    website_url: String,
    created_at: DateTime<Utc>,
    is_membership: bool,
}

impl BlogRow {
    fn into_blog(self) -> Blog {
        Blog {
            id: BlogId::from_uuid(self.id),
            content: BlogContent {
                name: self.name,
                description: self.description,
                website_url: WebsiteUrl::from_db(self.website_url),
            },
            created_at: self.created_at,
            is_membership: self.is_membership,
        }
    }

    fn into_view(self) -> BlogView {
        BlogView {
            id: BlogId::from_uuid(self.id),
            name: self.name,
            description: self.description,
            website_url: self.website_url,
            created_at: self.created_at,
            is_membership: self.is_membership,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    blog_id: Uuid,
    title: String,
    short_description: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl PostRow {
    fn into_post(self) -> Post {
        Post {
            id: PostId::from_uuid(self.id),
            blog_id: BlogId::from_uuid(self.blog_id),
            content: PostContent {
                title: self.title,
                short_description: self.short_description,
                content: self.content,
            },
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PostViewRow {
    id: Uuid,
    title: String,
    short_description: String,
    content: String,
    blog_id: Uuid,
    blog_name: String,
    created_at: DateTime<Utc>,
    likes_count: i64,
    dislikes_count: i64,
    my_status: String,
}

impl PostViewRow {
    fn into_view(self, newest_likes: Vec<NewestLike>) -> PostView {
        PostView {
            id: PostId::from_uuid(self.id),
            title: self.title,
            short_description: self.short_description,
            content: self.content,
            blog_id: BlogId::from_uuid(self.blog_id),
            blog_name: self.blog_name,
            created_at: self.created_at,
            extended_likes_info: ExtendedLikesInfo {
                likes_count: count(self.likes_count),
                dislikes_count: count(self.dislikes_count),
                my_status: LikeStatus::from_db(&self.my_status),
                newest_likes,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct NewestLikeRow {
    post_id: Uuid,
    user_id: Uuid,
    login: String,
    added_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    content: String,
    commentator_id: Uuid,
    commentator_login: String,
    created_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_comment(self) -> Comment {
        Comment {
            id: CommentId::from_uuid(self.id),
            post_id: PostId::from_uuid(self.post_id),
            content: self.content,
            commentator_id: UserId::from_uuid(self.commentator_id),
            commentator_login: self.commentator_login,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentViewRow {
    id: Uuid,
    content: String,
    commentator_id: Uuid,
    commentator_login: String,
    created_at: DateTime<Utc>,
    likes_count: i64,
    dislikes_count: i64,
    my_status: String,
}

impl CommentViewRow {
    fn into_view(self) -> CommentView {
        CommentView {
            id: CommentId::from_uuid(self.id),
            content: self.content,
            commentator_info: CommentatorInfo {
                user_id: UserId::from_uuid(self.commentator_id),
                user_login: self.commentator_login,
            },
            created_at: self.created_at,
            likes_info: LikesInfo {
                likes_count: count(self.likes_count),
                dislikes_count: count(self.dislikes_count),
                my_status: LikeStatus::from_db(&self.my_status),
            },
        }
    }
}
