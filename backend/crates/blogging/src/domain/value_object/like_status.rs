//! Like Status Value Object

use derive_more::Display;
use kernel::error::app_error::{AppError, AppResult};
use serde::Serialize;

/// A user's reaction to a post or comment. `None` is stored too, so a
/// withdrawn reaction keeps its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize)]
pub enum LikeStatus {
    #[default]
    None,
    Like,
    Dislike,
}

impl LikeStatus {
    /// Parse the exact wire value
    pub fn parse(raw: &str) -> AppResult<Self> {
        match raw {
            "None" => Ok(Self::None),
            "Like" => Ok(Self::Like),
            "Dislike" => Ok(Self::Dislike),
            _ => Err(AppError::bad_request(
                "Like status must be one of None, Like, Dislike",
            )),
        }
    }

    /// Stored value; unknown values read back as `None`
    pub fn from_db(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_default()
    }
}
