//! Server Configuration
//!
//! Read once at startup from the environment (after `.env` is loaded).

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::{AdminCredentials, AuthConfig};
use base64::Engine;
use base64::engine::general_purpose;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    /// Mounts `DELETE /testing/all-data`
    pub include_testing_module: bool,
    pub auth: AuthConfig,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset and empty values are treated alike
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address")?;
        let frontend_origins = var("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();
        let include_testing_module = parse_flag(var("INCLUDE_TESTING_MODULE"), false)
            .context("INCLUDE_TESTING_MODULE must be true or false")?;

        // Debug builds fall back to random secrets and a plain-HTTP cookie
        let mut auth = if cfg!(debug_assertions) {
            AuthConfig::development()
        } else {
            AuthConfig::default()
        };

        match (var("JWT_ACCESS_SECRET"), var("JWT_REFRESH_SECRET")) {
            (Some(access), Some(refresh)) => {
                auth.access_token_secret = access.into_bytes();
                auth.refresh_token_secret = refresh.into_bytes();
            }
            (None, None) if cfg!(debug_assertions) => {
                tracing::warn!("JWT secrets not set, using random development secrets");
            }
            _ => bail!("JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must both be set"),
        }

        if let Some(secs) = parse_secs(var("ACCESS_TOKEN_TTL_SECS"), "ACCESS_TOKEN_TTL_SECS")? {
            auth.access_token_ttl = secs;
        }
        if let Some(secs) = parse_secs(var("REFRESH_TOKEN_TTL_SECS"), "REFRESH_TOKEN_TTL_SECS")? {
            auth.refresh_token_ttl = secs;
        }
        if let Some(secs) =
            parse_secs(var("CONFIRMATION_CODE_TTL_SECS"), "CONFIRMATION_CODE_TTL_SECS")?
        {
            auth.confirmation_code_ttl = secs;
        }

        auth.admin = AdminCredentials {
            login: var("ADMIN_LOGIN").unwrap_or(auth.admin.login),
            password: var("ADMIN_PASSWORD").unwrap_or(auth.admin.password),
        };
        auth.cookie_secure = parse_flag(var("COOKIE_SECURE"), auth.cookie_secure)
            .context("COOKIE_SECURE must be true or false")?;
        if let Some(url) = var("FRONTEND_URL") {
            auth.frontend_url = url;
        }
        auth.trust_forwarded_for = parse_flag(var("TRUST_PROXY"), false)
            .context("TRUST_PROXY must be true or false")?;
        if let Some(pepper) = var("PASSWORD_PEPPER") {
            let pepper = general_purpose::STANDARD
                .decode(pepper.trim())
                .context("PASSWORD_PEPPER must be base64")?;
            auth.password_pepper = Some(pepper);
        }

        Ok(Self {
            database_url,
            bind_addr,
            frontend_origins,
            include_testing_module,
            auth,
        })
    }
}

fn parse_flag(raw: Option<String>, default: bool) -> anyhow::Result<bool> {
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None => Ok(default),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => bail!("invalid flag value {other:?}"),
    }
}

fn parse_secs(raw: Option<String>, key: &str) -> anyhow::Result<Option<Duration>> {
    raw.map(|value| {
        let secs: u64 = value
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number of seconds"))?;
        if secs == 0 {
            bail!("{key} must be positive");
        }
        Ok(Duration::from_secs(secs))
    })
    .transpose()
}
