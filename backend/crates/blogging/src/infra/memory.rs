//! In-memory store used by the service and router tests

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use kernel::id::{BlogId, CommentId, PostId, UserId};
use kernel::pagination::{Page, Paginated, SortDirection};

use crate::domain::entity::{blog::Blog, comment::Comment, post::Post};
use crate::domain::read_model::{
    BlogFilter, BlogView, CommentView, CommentatorInfo, ExtendedLikesInfo, LikesInfo,
    NEWEST_LIKES_LIMIT, NewestLike, PostView,
};
use crate::domain::repository::{
    BlogRepository, BloggingQueryRepository, CommentRepository, LikeRepository, PostRepository,
    UserDirectory,
};
use crate::domain::value_object::like_status::LikeStatus;
use crate::error::BlogResult;

#[derive(Debug, Clone, Copy)]
struct Reaction {
    status: LikeStatus,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    users: HashMap<UserId, String>,
    blogs: HashMap<BlogId, Blog>,
    posts: HashMap<PostId, Post>,
    comments: HashMap<CommentId, Comment>,
    post_likes: HashMap<(PostId, UserId), Reaction>,
    comment_likes: HashMap<(CommentId, UserId), Reaction>,
}

#[derive(Clone, Default)]
pub struct InMemoryBloggingStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryBloggingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_user(&self, user_id: UserId, login: &str) {
        self.lock().users.insert(user_id, login.to_string());
    }

    /// Number of stored blogs, posts and comments
    pub fn len(&self) -> usize {
        let state = self.lock();
        state.blogs.len() + state.posts.len() + state.comments.len()
    }
}

fn upsert<K>(likes: &mut HashMap<K, Reaction>, key: K, status: LikeStatus, now: DateTime<Utc>)
where
    K: std::hash::Hash + Eq,
{
    match likes.get_mut(&key) {
        Some(reaction) if reaction.status == status => {}
        Some(reaction) => {
            reaction.status = status;
            reaction.updated_at = now;
        }
        None => {
            likes.insert(
                key,
                Reaction {
                    status,
                    updated_at: now,
                },
            );
        }
    }
}

fn directed(ord: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

fn paginate<T>(items: Vec<T>, page: &Page) -> Paginated<T> {
    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    Paginated::new(items, total, page)
}

impl State {
    fn blog_view(blog: &Blog) -> BlogView {
        BlogView {
            id: blog.id,
            name: blog.content.name.clone(),
            description: blog.content.description.clone(),
            website_url: blog.content.website_url.as_str().to_string(),
            created_at: blog.created_at,
            is_membership: blog.is_membership,
        }
    }

    fn post_view(&self, post: &Post, viewer: Option<&UserId>) -> PostView {
        let reactions: Vec<(&UserId, &Reaction)> = self
            .post_likes
            .iter()
            .filter(|((post_id, _), _)| post_id == &post.id)
            .map(|((_, user_id), reaction)| (user_id, reaction))
            .collect();

        let count = |status: LikeStatus| reactions.iter().filter(|(_, r)| r.status == status).count() as u64;
        let my_status = viewer
            .and_then(|viewer| reactions.iter().find(|(user_id, _)| *user_id == viewer))
            .map(|(_, r)| r.status)
            .unwrap_or_default();

        let mut likes: Vec<_> = reactions
            .iter()
            .filter(|(_, r)| r.status == LikeStatus::Like)
            .collect();
        likes.sort_by(|a, b| b.1.updated_at.cmp(&a.1.updated_at));
        let newest_likes = likes
            .into_iter()
            .take(NEWEST_LIKES_LIMIT)
            .map(|(user_id, r)| NewestLike {
                added_at: r.updated_at,
                user_id: **user_id,
                login: self.users.get(*user_id).cloned().unwrap_or_default(),
            })
            .collect();

        PostView {
            id: post.id,
            title: post.content.title.clone(),
            short_description: post.content.short_description.clone(),
            content: post.content.content.clone(),
            blog_id: post.blog_id,
            blog_name: self
                .blogs
                .get(&post.blog_id)
                .map(|b| b.content.name.clone())
                .unwrap_or_default(),
            created_at: post.created_at,
            extended_likes_info: ExtendedLikesInfo {
                likes_count: count(LikeStatus::Like),
                dislikes_count: count(LikeStatus::Dislike),
                my_status,
                newest_likes,
            },
        }
    }

    fn comment_view(&self, comment: &Comment, viewer: Option<&UserId>) -> CommentView {
        let reactions = || {
            self.comment_likes
                .iter()
                .filter(move |((comment_id, _), _)| comment_id == &comment.id)
        };
        let count = |status: LikeStatus| reactions().filter(|(_, r)| r.status == status).count() as u64;
        let my_status = viewer
            .and_then(|viewer| reactions().find(|((_, user_id), _)| user_id == viewer))
            .map(|(_, r)| r.status)
            .unwrap_or_default();

        CommentView {
            id: comment.id,
            content: comment.content.clone(),
            commentator_info: CommentatorInfo {
                user_id: comment.commentator_id,
                user_login: comment.commentator_login.clone(),
            },
            created_at: comment.created_at,
            likes_info: LikesInfo {
                likes_count: count(LikeStatus::Like),
                dislikes_count: count(LikeStatus::Dislike),
                my_status,
            },
        }
    }

    fn remove_post(&mut self, post_id: &PostId) -> bool {
        if self.posts.remove(post_id).is_none() {
            return false;
        }
        self.post_likes.retain(|(id, _), _| id != post_id);
        let orphaned: Vec<CommentId> = self
            .comments
            .values()
            .filter(|c| &c.post_id == post_id)
            .map(|c| c.id)
            .collect();
        for comment_id in orphaned {
            self.remove_comment(&comment_id);
        }
        true
    }

    fn remove_comment(&mut self, comment_id: &CommentId) -> bool {
        self.comment_likes.retain(|(id, _), _| id != comment_id);
        self.comments.remove(comment_id).is_some()
    }
}

impl BlogRepository for InMemoryBloggingStore {
    async fn insert_blog(&self, blog: &Blog) -> BlogResult<()> {
        self.lock().blogs.insert(blog.id, blog.clone());
        Ok(())
    }

    async fn find_blog(&self, blog_id: &BlogId) -> BlogResult<Option<Blog>> {
        Ok(self.lock().blogs.get(blog_id).cloned())
    }

    async fn update_blog(&self, blog: &Blog) -> BlogResult<()> {
        self.lock().blogs.insert(blog.id, blog.clone());
        Ok(())
    }

    async fn delete_blog(&self, blog_id: &BlogId) -> BlogResult<bool> {
        let mut state = self.lock();
        if state.blogs.remove(blog_id).is_none() {
            return Ok(false);
        }
        let posts: Vec<PostId> = state
            .posts
            .values()
            .filter(|p| &p.blog_id == blog_id)
            .map(|p| p.id)
            .collect();
        for post_id in posts {
            state.remove_post(&post_id);
        }
        Ok(true)
    }
}

impl PostRepository for InMemoryBloggingStore {
    async fn insert_post(&self, post: &Post) -> BlogResult<()> {
        self.lock().posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn find_post(&self, post_id: &PostId) -> BlogResult<Option<Post>> {
        Ok(self.lock().posts.get(post_id).cloned())
    }

    async fn update_post(&self, post: &Post) -> BlogResult<()> {
        self.lock().posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn delete_post(&self, post_id: &PostId) -> BlogResult<bool> {
        Ok(self.lock().remove_post(post_id))
    }
}

impl CommentRepository for InMemoryBloggingStore {
    async fn insert_comment(&self, comment: &Comment) -> BlogResult<()> {
        self.lock().comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn find_comment(&self, comment_id: &CommentId) -> BlogResult<Option<Comment>> {
        Ok(self.lock().comments.get(comment_id).cloned())
    }

    async fn update_comment(&self, comment: &Comment) -> BlogResult<()> {
        self.lock().comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn delete_comment(&self, comment_id: &CommentId) -> BlogResult<bool> {
        Ok(self.lock().remove_comment(comment_id))
    }
}

impl LikeRepository for InMemoryBloggingStore {
    async fn set_post_like(
        &self,
        post_id: &PostId,
        user_id: &UserId,
        status: LikeStatus,
        now: DateTime<Utc>,
    ) -> BlogResult<()> {
        upsert(&mut self.lock().post_likes, (*post_id, *user_id), status, now);
        Ok(())
    }

    async fn set_comment_like(
        &self,
        comment_id: &CommentId,
        user_id: &UserId,
        status: LikeStatus,
        now: DateTime<Utc>,
    ) -> BlogResult<()> {
        upsert(
            &mut self.lock().comment_likes,
            (*comment_id, *user_id),
            status,
            now,
        );
        Ok(())
    }
}

impl UserDirectory for InMemoryBloggingStore {
    async fn find_user_login(&self, user_id: &UserId) -> BlogResult<Option<String>> {
        Ok(self.lock().users.get(user_id).cloned())
    }
}

impl BloggingQueryRepository for InMemoryBloggingStore {
    async fn list_blogs(&self, filter: &BlogFilter, page: &Page) -> BlogResult<Paginated<BlogView>> {
        let state = self.lock();
        let term = filter.search_name_term.as_deref().map(str::to_lowercase);
        let mut blogs: Vec<BlogView> = state
            .blogs
            .values()
            .filter(|b| {
                term.as_deref()
                    .is_none_or(|t| b.content.name.to_lowercase().contains(t))
            })
            .map(State::blog_view)
            .collect();

        blogs.sort_by(|a, b| {
            let ord = match page.sort_column {
                "name" => a.name.cmp(&b.name),
                "description" => a.description.cmp(&b.description),
                "website_url" => a.website_url.cmp(&b.website_url),
                "is_membership" => a.is_membership.cmp(&b.is_membership),
                _ => a.created_at.cmp(&b.created_at),
            };
            directed(ord, page.direction)
        });
        Ok(paginate(blogs, page))
    }

    async fn find_blog_view(&self, blog_id: &BlogId) -> BlogResult<Option<BlogView>> {
        Ok(self.lock().blogs.get(blog_id).map(State::blog_view))
    }

    async fn list_posts(
        &self,
        blog_id: Option<&BlogId>,
        viewer: Option<&UserId>,
        page: &Page,
    ) -> BlogResult<Paginated<PostView>> {
        let state = self.lock();
        let mut posts: Vec<PostView> = state
            .posts
            .values()
            .filter(|p| blog_id.is_none_or(|id| &p.blog_id == id))
            .map(|p| state.post_view(p, viewer))
            .collect();

        posts.sort_by(|a, b| {
            let ord = match page.sort_column {
                "title" => a.title.cmp(&b.title),
                "short_description" => a.short_description.cmp(&b.short_description),
                "content" => a.content.cmp(&b.content),
                "blog_id" => a.blog_id.to_string().cmp(&b.blog_id.to_string()),
                "blog_name" => a.blog_name.cmp(&b.blog_name),
                _ => a.created_at.cmp(&b.created_at),
            };
            directed(ord, page.direction)
        });
        Ok(paginate(posts, page))
    }

    async fn find_post_view(
        &self,
        post_id: &PostId,
        viewer: Option<&UserId>,
    ) -> BlogResult<Option<PostView>> {
        let state = self.lock();
        Ok(state.posts.get(post_id).map(|p| state.post_view(p, viewer)))
    }

    async fn list_comments(
        &self,
        post_id: &PostId,
        viewer: Option<&UserId>,
        page: &Page,
    ) -> BlogResult<Paginated<CommentView>> {
        let state = self.lock();
        let mut comments: Vec<CommentView> = state
            .comments
            .values()
            .filter(|c| &c.post_id == post_id)
            .map(|c| state.comment_view(c, viewer))
            .collect();

        comments.sort_by(|a, b| {
            let ord = match page.sort_column {
                "content" => a.content.cmp(&b.content),
                _ => a.created_at.cmp(&b.created_at),
            };
            directed(ord, page.direction)
        });
        Ok(paginate(comments, page))
    }

    async fn find_comment_view(
        &self,
        comment_id: &CommentId,
        viewer: Option<&UserId>,
    ) -> BlogResult<Option<CommentView>> {
        let state = self.lock();
        Ok(state
            .comments
            .get(comment_id)
            .map(|c| state.comment_view(c, viewer)))
    }
}
