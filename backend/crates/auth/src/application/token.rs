//! Token Service
//!
//! HS256 JWTs. Access and refresh tokens are signed with different keys so
//! one can never be replayed as the other.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use kernel::id::{DeviceId, UserId};
use serde::{Deserialize, Serialize};

use crate::application::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccessClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshClaims {
    sub: String,
    device_id: String,
    iat: i64,
    exp: i64,
}

/// Decoded refresh token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshToken {
    pub user_id: UserId,
    pub device_id: DeviceId,
    /// Unix seconds; compared against the device session's `issued_at`
    pub issued_at: i64,
}

/// Access + refresh token pair returned by login and refresh
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: TimeDelta,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; sessions already carry their own lifetime
        validation.leeway = 0;

        Self {
            access_encoding: EncodingKey::from_secret(&config.access_token_secret),
            access_decoding: DecodingKey::from_secret(&config.access_token_secret),
            refresh_encoding: EncodingKey::from_secret(&config.refresh_token_secret),
            refresh_decoding: DecodingKey::from_secret(&config.refresh_token_secret),
            access_ttl: config.access_token_ttl(),
            validation,
        }
    }

    /// Issue an access token at `now` and a refresh token bound to the
    /// session's `issued_at` / `expires_at`
    pub fn issue_pair(
        &self,
        user_id: &UserId,
        device_id: &DeviceId,
        now: DateTime<Utc>,
        session_issued_at: DateTime<Utc>,
        session_expires_at: DateTime<Utc>,
    ) -> AuthResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access(user_id, now)?,
            refresh_token: self.issue_refresh(
                user_id,
                device_id,
                session_issued_at,
                session_expires_at,
            )?,
        })
    }

    pub fn issue_access(&self, user_id: &UserId, now: DateTime<Utc>) -> AuthResult<String> {
        let claims = AccessClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.access_encoding)
            .map_err(|e| AuthError::Internal(format!("Failed to sign access token: {}", e)))
    }

    fn issue_refresh(
        &self,
        user_id: &UserId,
        device_id: &DeviceId,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<String> {
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            device_id: device_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.refresh_encoding)
            .map_err(|e| AuthError::Internal(format!("Failed to sign refresh token: {}", e)))
    }

    /// Validate an access token and return its subject
    pub fn verify_access(&self, token: &str) -> AuthResult<UserId> {
        let data = decode::<AccessClaims>(token, &self.access_decoding, &self.validation)
            .map_err(|_| AuthError::AccessTokenInvalid)?;
        UserId::parse_str(&data.claims.sub).ok_or(AuthError::AccessTokenInvalid)
    }

    /// Validate a refresh token's signature and expiry.
    ///
    /// Whether it is still the *current* token of its device is decided by
    /// the session store, not here.
    pub fn verify_refresh(&self, token: &str) -> AuthResult<RefreshToken> {
        let data = decode::<RefreshClaims>(token, &self.refresh_decoding, &self.validation)
            .map_err(|_| AuthError::SessionInvalid)?;
        let claims = data.claims;

        Ok(RefreshToken {
            user_id: UserId::parse_str(&claims.sub).ok_or(AuthError::SessionInvalid)?,
            device_id: DeviceId::parse_str(&claims.device_id).ok_or(AuthError::SessionInvalid)?,
            issued_at: claims.iat,
        })
    }
}
