//! Bounded Text
//!
//! Length rules for the free-text fields of blogs, posts and comments.
//! Input is trimmed before counting; length is in characters.

use kernel::error::app_error::{AppError, AppResult};

/// Inclusive character bounds of a text field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRule {
    pub label: &'static str,
    pub min: usize,
    pub max: usize,
}

impl TextRule {
    pub const fn new(label: &'static str, min: usize, max: usize) -> Self {
        Self { label, min, max }
    }

    pub fn apply(&self, raw: &str) -> AppResult<String> {
        let text = raw.trim();
        let length = text.chars().count();

        if length < self.min || length > self.max {
            return Err(AppError::bad_request(if self.min <= 1 {
                format!("{} is required and must be at most {} characters", self.label, self.max)
            } else {
                format!(
                    "{} must be between {} and {} characters",
                    self.label, self.min, self.max
                )
            }));
        }

        Ok(text.to_string())
    }
}

pub const BLOG_NAME: TextRule = TextRule::new("Name", 1, 15);
pub const BLOG_DESCRIPTION: TextRule = TextRule::new("Description", 1, 500);
pub const POST_TITLE: TextRule = TextRule::new("Title", 1, 30);
pub const POST_SHORT_DESCRIPTION: TextRule = TextRule::new("Short description", 1, 100);
pub const POST_CONTENT: TextRule = TextRule::new("Content", 1, 1000);
pub const COMMENT_CONTENT: TextRule = TextRule::new("Content", 20, 300);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_before_counting() {
        assert_eq!(BLOG_NAME.apply("  Rust  ").unwrap(), "Rust");
        assert!(BLOG_NAME.apply("   ").is_err());
        assert!(BLOG_NAME.apply("sixteen chars!!!").is_err());
    }

    #[test]
    fn test_comment_bounds() {
        assert!(COMMENT_CONTENT.apply("too short").is_err());
        assert!(COMMENT_CONTENT.apply(&"a".repeat(20)).is_ok());
        assert!(COMMENT_CONTENT.apply(&"a".repeat(301)).is_err());
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        assert!(POST_TITLE.apply(&"é".repeat(30)).is_ok());
    }
}
