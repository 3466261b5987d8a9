//! Comment Service

use std::sync::Arc;

use chrono::Utc;
use kernel::error::app_error::AppError;
use kernel::error::field::FieldErrors;
use kernel::id::{CommentId, UserId};

use crate::application::posts::parse_post_id;
use crate::domain::entity::comment::Comment;
use crate::domain::repository::{CommentRepository, PostRepository, UserDirectory};
use crate::domain::value_object::text::COMMENT_CONTENT;
use crate::error::{BlogError, BlogResult};

fn validate_content(content: &str) -> BlogResult<String> {
    let mut errors = FieldErrors::new();
    let content = errors.check("content", COMMENT_CONTENT.apply(content));
    Ok(errors.finish(content)?)
}

pub(crate) fn parse_comment_id(raw: &str) -> BlogResult<CommentId> {
    CommentId::parse_str(raw).ok_or(BlogError::CommentNotFound)
}

pub struct CommentService<R>
where
    R: PostRepository + CommentRepository + UserDirectory,
{
    repo: Arc<R>,
}

impl<R> CommentService<R>
where
    R: PostRepository + CommentRepository + UserDirectory,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, post_id: &str, author: &UserId, content: &str) -> BlogResult<Comment> {
        let content = validate_content(content)?;
        let post_id = parse_post_id(post_id)?;

        if self.repo.find_post(&post_id).await?.is_none() {
            return Err(BlogError::PostNotFound);
        }

        // the token outlived its account
        let login = self
            .repo
            .find_user_login(author)
            .await?
            .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;

        let comment = Comment::create(post_id, *author, login, content, Utc::now());
        self.repo.insert_comment(&comment).await?;

        tracing::info!(comment_id = %comment.id, post_id = %comment.post_id, "Comment created");
        Ok(comment)
    }

    /// Load a comment and check that `user_id` wrote it
    async fn owned(&self, comment_id: &str, user_id: &UserId) -> BlogResult<Comment> {
        let comment_id = parse_comment_id(comment_id)?;
        let comment = self
            .repo
            .find_comment(&comment_id)
            .await?
            .ok_or(BlogError::CommentNotFound)?;

        if !comment.is_written_by(user_id) {
            return Err(BlogError::NotCommentOwner);
        }
        Ok(comment)
    }

    pub async fn update(&self, comment_id: &str, user_id: &UserId, content: &str) -> BlogResult<()> {
        let content = validate_content(content)?;
        let mut comment = self.owned(comment_id, user_id).await?;

        comment.content = content;
        self.repo.update_comment(&comment).await?;

        tracing::info!(comment_id = %comment.id, "Comment updated");
        Ok(())
    }

    pub async fn delete(&self, comment_id: &str, user_id: &UserId) -> BlogResult<()> {
        let comment = self.owned(comment_id, user_id).await?;
        self.repo.delete_comment(&comment.id).await?;

        tracing::info!(comment_id = %comment.id, "Comment deleted");
        Ok(())
    }
}
