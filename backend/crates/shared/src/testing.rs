//! Test helpers (feature `test-util`)

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

#[derive(Debug)]
struct SqlState(&'static str);

impl fmt::Display for SqlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "database error {}", self.0)
    }
}

impl Error for SqlState {}

impl sqlx::error::DatabaseError for SqlState {
    fn message(&self) -> &str {
        "database error"
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.0))
    }

    fn as_error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn Error + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn Error + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> sqlx::error::ErrorKind {
        match self.0 {
            "23505" => sqlx::error::ErrorKind::UniqueViolation,
            "23503" => sqlx::error::ErrorKind::ForeignKeyViolation,
            "23502" => sqlx::error::ErrorKind::NotNullViolation,
            "23514" => sqlx::error::ErrorKind::CheckViolation,
            _ => sqlx::error::ErrorKind::Other,
        }
    }
}

/// `sqlx::Error::Database` carrying the given SQLSTATE
pub fn database_error(code: &'static str) -> sqlx::Error {
    sqlx::Error::Database(Box::new(SqlState(code)))
}
