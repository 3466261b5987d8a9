//! Blogging Error Types
//!
//! Blogging-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::conversions::is_constraint_violation;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type BlogResult<T> = Result<T, BlogError>;

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("Blog not found")]
    BlogNotFound,

    #[error("Post not found")]
    PostNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    /// Comment edits and deletes are reserved to its author
    #[error("Comment belongs to another user")]
    NotCommentOwner,

    /// Client-facing rejection (validation) carrying its own body
    #[error("{0}")]
    Rejected(AppError),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BlogError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BlogError::BlogNotFound | BlogError::PostNotFound | BlogError::CommentNotFound => {
                ErrorKind::NotFound
            }
            BlogError::NotCommentOwner => ErrorKind::Forbidden,
            BlogError::Rejected(err) => err.kind(),
            BlogError::Database(_) | BlogError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn into_app_error(self) -> AppError {
        match self {
            BlogError::Rejected(err) => err,
            BlogError::Database(_) | BlogError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    fn log(&self) {
        match self {
            BlogError::Database(e) => tracing::error!(error = %e, "Blogging database error"),
            BlogError::Internal(msg) => tracing::error!(message = %msg, "Blogging internal error"),
            BlogError::NotCommentOwner => tracing::warn!("Comment ownership violation"),
            _ => tracing::debug!(error = %self, "Blogging error"),
        }
    }
}

impl IntoResponse for BlogError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

/// Constraint violations keep their SQLSTATE mapping (a row deleted by a
/// concurrent request is a 404); anything else is a logged 500.
impl From<sqlx::Error> for BlogError {
    fn from(err: sqlx::Error) -> Self {
        if is_constraint_violation(&err) {
            BlogError::Rejected(AppError::from(err))
        } else {
            BlogError::Database(err)
        }
    }
}

impl From<AppError> for BlogError {
    fn from(err: AppError) -> Self {
        if err.is_server_error() {
            BlogError::Internal(err.to_string())
        } else {
            BlogError::Rejected(err)
        }
    }
}
