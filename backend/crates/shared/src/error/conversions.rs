//! Error conversions
//!
//! `sqlx` errors map to a kind by SQLSTATE; `AppError` renders as an RFC 7807
//! body that also carries `errorsMessages` when field errors are present.

use super::app_error::AppError;

/// PostgreSQL SQLSTATE → client-facing error
///
/// <https://www.postgresql.org/docs/current/errcodes-appendix.html>
#[cfg(feature = "sqlx")]
fn from_sqlstate(code: &str) -> AppError {
    match code {
        // the parent row vanished between check and insert
        "23503" => AppError::not_found("Referenced record no longer exists"),
        "23505" => AppError::conflict("Duplicate key value"),
        "23502" | "23514" => AppError::bad_request("Value violates a column constraint"),
        "40001" | "40P01" => AppError::service_unavailable("Concurrent update, retry the request"),
        code if code.starts_with("53") || code.starts_with("57") => {
            AppError::service_unavailable("Database unavailable")
        }
        _ => AppError::internal("Database error"),
    }
}

/// Integrity violations caused by the request itself (a parent row deleted by
/// a concurrent request, a duplicate key). Domain errors pass these through
/// [`From<sqlx::Error>`] instead of masking them as 500.
#[cfg(feature = "sqlx")]
pub fn is_constraint_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => matches!(
            db_err.code().as_deref(),
            Some("23503" | "23505" | "23502" | "23514")
        ),
        _ => false,
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let app_err = match &err {
            sqlx::Error::RowNotFound => AppError::not_found("Record not found"),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::service_unavailable("Database connection unavailable")
            }
            sqlx::Error::Database(db_err) => match db_err.code() {
                Some(code) => from_sqlstate(&code),
                None => AppError::internal("Database error"),
            },
            _ => AppError::internal("Database error"),
        };
        app_err.with_source(err)
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // RFC 7807 Problem Details
        let mut body = serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "detail": self.message(),
            "action": self.action(),
        });

        if !self.field_errors().is_empty() {
            body["errorsMessages"] = serde_json::json!(self.field_errors());
        }

        (status, Json(body)).into_response()
    }
}
