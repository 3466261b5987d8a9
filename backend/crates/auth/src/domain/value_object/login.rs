//! Login Value Object
//!
//! 3 to 10 characters from `[a-zA-Z0-9_-]`. Logins are case-sensitive.

use std::sync::LazyLock;

use kernel::error::app_error::{AppError, AppResult};
use regex::Regex;

const LOGIN_MIN_LENGTH: usize = 3;
const LOGIN_MAX_LENGTH: usize = 10;

static LOGIN_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]*$"));

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Login(String);

impl Login {
    pub fn new(raw: impl Into<String>) -> AppResult<Self> {
        let login = raw.into().trim().to_string();
        let length = login.chars().count();

        if !(LOGIN_MIN_LENGTH..=LOGIN_MAX_LENGTH).contains(&length) {
            return Err(AppError::bad_request(format!(
                "Login must be between {} and {} characters",
                LOGIN_MIN_LENGTH, LOGIN_MAX_LENGTH
            )));
        }

        if !matches!(&*LOGIN_PATTERN, Ok(pattern) if pattern.is_match(&login)) {
            return Err(AppError::bad_request(
                "Login may only contain letters, digits, '_' and '-'",
            ));
        }

        Ok(Self(login))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(login: impl Into<String>) -> Self {
        Self(login.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Login {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
