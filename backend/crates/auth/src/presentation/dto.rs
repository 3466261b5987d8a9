//! API DTOs (Data Transfer Objects)
//!
//! Missing string fields deserialize as empty so they fail field validation
//! with a proper `errorsMessages` entry instead of a body rejection.

use kernel::pagination::PageParams;
use serde::{Deserialize, Serialize};

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub login_or_email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

/// Body of `/auth/registration` and `POST /sa/users`
#[derive(Debug, Clone, Deserialize)]
pub struct NewUserRequest {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CodeRequest {
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPasswordRequest {
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub recovery_code: String,
}

// ============================================================================
// Users
// ============================================================================

/// `GET /sa/users` query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersQuery {
    pub search_login_term: Option<String>,
    pub search_email_term: Option<String>,
    #[serde(flatten)]
    pub page: PageParams,
}

/// Sortable user columns; the first is the default
pub const USER_SORT_COLUMNS: &[(&str, &str)] = &[
    ("createdAt", "created_at"),
    ("login", "login"),
    ("email", "email"),
];
