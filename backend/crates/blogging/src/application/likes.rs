//! Like Service

use std::sync::Arc;

use chrono::Utc;
use kernel::error::app_error::AppError;
use kernel::error::field::FieldErrors;
use kernel::id::UserId;

use crate::application::comments::parse_comment_id;
use crate::application::posts::parse_post_id;
use crate::domain::repository::{CommentRepository, LikeRepository, PostRepository, UserDirectory};
use crate::domain::value_object::like_status::LikeStatus;
use crate::error::{BlogError, BlogResult};

fn validate_status(raw: &str) -> BlogResult<LikeStatus> {
    let mut errors = FieldErrors::new();
    let status = errors.check("likeStatus", LikeStatus::parse(raw));
    Ok(errors.finish(status)?)
}

pub struct LikeService<R>
where
    R: PostRepository + CommentRepository + LikeRepository + UserDirectory,
{
    repo: Arc<R>,
}

impl<R> LikeService<R>
where
    R: PostRepository + CommentRepository + LikeRepository + UserDirectory,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// An access token can outlive the account it was issued for
    async fn ensure_user_exists(&self, user_id: &UserId) -> BlogResult<()> {
        match self.repo.find_user_login(user_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::unauthorized("User no longer exists").into()),
        }
    }

    pub async fn react_to_post(&self, post_id: &str, user_id: &UserId, status: &str) -> BlogResult<()> {
        let status = validate_status(status)?;
        let post_id = parse_post_id(post_id)?;

        if self.repo.find_post(&post_id).await?.is_none() {
            return Err(BlogError::PostNotFound);
        }
        self.ensure_user_exists(user_id).await?;
        self.repo
            .set_post_like(&post_id, user_id, status, Utc::now())
            .await?;

        tracing::debug!(post_id = %post_id, user_id = %user_id, status = %status, "Post reaction set");
        Ok(())
    }

    pub async fn react_to_comment(
        &self,
        comment_id: &str,
        user_id: &UserId,
        status: &str,
    ) -> BlogResult<()> {
        let status = validate_status(status)?;
        let comment_id = parse_comment_id(comment_id)?;

        if self.repo.find_comment(&comment_id).await?.is_none() {
            return Err(BlogError::CommentNotFound);
        }
        self.ensure_user_exists(user_id).await?;
        self.repo
            .set_comment_like(&comment_id, user_id, status, Utc::now())
            .await?;

        tracing::debug!(comment_id = %comment_id, user_id = %user_id, status = %status, "Comment reaction set");
        Ok(())
    }
}
