//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use chrono::TimeDelta;
use platform::rate_limit::RateLimitConfig;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Credentials for the `/sa` Basic-auth guard
#[derive(Clone)]
pub struct AdminCredentials {
    pub login: String,
    pub password: String,
}

impl AdminCredentials {
    /// Constant-time check of a decoded `login:password` pair
    pub fn matches(&self, login: &str, password: &str) -> bool {
        let login_ok = platform::crypto::secrets_match(self.login.as_bytes(), login.as_bytes());
        let password_ok =
            platform::crypto::secrets_match(self.password.as_bytes(), password.as_bytes());
        login_ok & password_ok
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 key for access tokens
    pub access_token_secret: Vec<u8>,
    /// HS256 key for refresh tokens
    pub refresh_token_secret: Vec<u8>,
    /// Access token lifetime (10 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token and device session lifetime (14 days)
    pub refresh_token_ttl: Duration,
    /// Email confirmation and password recovery code lifetime (1 hour)
    pub confirmation_code_ttl: Duration,
    /// Refresh token cookie name
    pub refresh_cookie_name: String,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Basic-auth credentials for `/sa` routes
    pub admin: AdminCredentials,
    /// Base URL used to build links in outgoing emails
    pub frontend_url: String,
    /// Limit applied to login, registration and recovery endpoints
    pub rate_limit: RateLimitConfig,
    /// Read the client IP from X-Forwarded-For (only behind a reverse proxy)
    pub trust_forwarded_for: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: Vec::new(),
            refresh_token_secret: Vec::new(),
            access_token_ttl: Duration::from_secs(10 * 60),
            refresh_token_ttl: Duration::from_secs(14 * 24 * 3600),
            confirmation_code_ttl: Duration::from_secs(3600),
            refresh_cookie_name: "refreshToken".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Strict,
            password_pepper: None,
            admin: AdminCredentials {
                login: "admin".to_string(),
                password: "qwerty".to_string(),
            },
            frontend_url: "http://localhost:3000".to_string(),
            rate_limit: RateLimitConfig::default(),
            trust_forwarded_for: false,
        }
    }
}

impl AuthConfig {
    /// Create config with random token secrets (for development)
    pub fn with_random_secrets() -> Self {
        use rand::RngCore;
        let mut access = vec![0u8; 32];
        let mut refresh = vec![0u8; 32];
        rand::rng().fill_bytes(&mut access);
        rand::rng().fill_bytes(&mut refresh);
        Self {
            access_token_secret: access,
            refresh_token_secret: refresh,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            cookie_same_site: SameSite::Lax,
            ..Self::with_random_secrets()
        }
    }

    pub fn access_token_ttl(&self) -> TimeDelta {
        to_time_delta(self.access_token_ttl)
    }

    pub fn refresh_token_ttl(&self) -> TimeDelta {
        to_time_delta(self.refresh_token_ttl)
    }

    pub fn confirmation_code_ttl(&self) -> TimeDelta {
        to_time_delta(self.confirmation_code_ttl)
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Cookie settings for the refresh token
    pub fn refresh_cookie(&self) -> platform::cookie::CookieConfig {
        platform::cookie::CookieConfig {
            name: self.refresh_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: i64::try_from(self.refresh_token_ttl.as_secs()).ok(),
        }
    }
}

fn to_time_delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}
