//! Website URL Value Object
//!
//! `https://` URLs of at most 100 characters, host made of dot-separated
//! labels, optional path segments.

use std::sync::LazyLock;

use kernel::error::app_error::{AppError, AppResult};
use regex::Regex;

const WEBSITE_URL_MAX_LENGTH: usize = 100;

static WEBSITE_URL_PATTERN: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"^https://([a-zA-Z0-9_-]+\.)+[a-zA-Z0-9_-]+(/[a-zA-Z0-9_-]+)*/?$")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebsiteUrl(String);

impl WebsiteUrl {
    pub fn new(raw: impl Into<String>) -> AppResult<Self> {
        let url = raw.into().trim().to_string();

        if url.is_empty() || url.chars().count() > WEBSITE_URL_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Website URL is required and must be at most {} characters",
                WEBSITE_URL_MAX_LENGTH
            )));
        }

        if !matches!(&*WEBSITE_URL_PATTERN, Ok(pattern) if pattern.is_match(&url)) {
            return Err(AppError::bad_request("Website URL must be a valid https URL"));
        }

        Ok(Self(url))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
