//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::conversions::is_constraint_violation;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong login/email or password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed or expired access token
    #[error("Access token is missing or invalid")]
    AccessTokenInvalid,

    /// Refresh token does not match a live device session
    #[error("Session not found or expired")]
    SessionInvalid,

    /// Admin Basic credentials missing or wrong
    #[error("Admin credentials are missing or invalid")]
    AdminCredentialsInvalid,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Device session not found
    #[error("Device not found")]
    DeviceNotFound,

    /// Device session belongs to another user
    #[error("Device belongs to another user")]
    DeviceForbidden,

    /// Client-facing rejection (validation, rate limit) carrying its own body
    #[error("{0}")]
    Rejected(AppError),

    /// Database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::AccessTokenInvalid
            | AuthError::SessionInvalid
            | AuthError::AdminCredentialsInvalid => ErrorKind::Unauthorized,
            AuthError::UserNotFound | AuthError::DeviceNotFound => ErrorKind::NotFound,
            AuthError::DeviceForbidden => ErrorKind::Forbidden,
            AuthError::Rejected(err) => err.kind(),
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn into_app_error(self) -> AppError {
        match self {
            AuthError::Rejected(err) => err,
            // Infrastructure details stay in the logs
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::SessionInvalid => {
                tracing::warn!("Rejected refresh token");
            }
            AuthError::AdminCredentialsInvalid => {
                tracing::warn!("Rejected admin credentials");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

/// Constraint violations keep their SQLSTATE mapping (a row deleted by a
/// concurrent request is a 404); anything else is a logged 500.
impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        if is_constraint_violation(&err) {
            AuthError::Rejected(AppError::from(err))
        } else {
            AuthError::Database(err)
        }
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        if err.is_server_error() {
            AuthError::Internal(err.to_string())
        } else {
            AuthError::Rejected(err)
        }
    }
}

impl From<platform::password::PasswordHashError> for AuthError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::SessionInvalid.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::DeviceNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AuthError::DeviceForbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_client_app_error_is_kept() {
        let err: AuthError = AppError::bad_request("Login is already taken")
            .with_field("login")
            .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let app = err.into_app_error();
        assert_eq!(app.field_errors()[0].field, "login");
    }

    #[test]
    fn test_server_app_error_becomes_internal() {
        let err: AuthError = AppError::internal("pool closed").into();
        assert!(matches!(err, AuthError::Internal(_)));
        assert_eq!(err.into_app_error().message(), "Internal server error");
    }

    #[test]
    fn test_constraint_violation_keeps_its_status() {
        use kernel::testing::database_error;

        let err = AuthError::from(database_error("23503"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = AuthError::from(database_error("23505"));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err = AuthError::from(database_error("XX000"));
        assert!(matches!(err, AuthError::Database(_)));
        assert_eq!(err.into_app_error().message(), "Internal server error");
    }
}
