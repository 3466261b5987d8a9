//! Device Session Entity
//!
//! One row per refresh-token lineage. A refresh token is valid only while
//! its `iat` equals the session's `issued_at`; every refresh moves
//! `issued_at` forward, so older tokens of the same device stop working.

use chrono::{DateTime, TimeDelta, Utc};
use kernel::id::{DeviceId, UserId};
use platform::client::ClientInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSession {
    pub device_id: DeviceId,
    pub user_id: UserId,
    /// Issue time of the current refresh token (whole seconds)
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub ip: String,
    pub device_name: String,
    pub last_active_at: DateTime<Utc>,
}

impl DeviceSession {
    /// Start a session at login
    pub fn start(user_id: UserId, client: &ClientInfo, now: DateTime<Utc>, ttl: TimeDelta) -> Self {
        let issued_at = truncate_to_secs(now);
        Self {
            device_id: DeviceId::new(),
            user_id,
            issued_at,
            expires_at: issued_at + ttl,
            ip: client.ip_string(),
            device_name: client.device_name.clone(),
            last_active_at: issued_at,
        }
    }

    /// Move the session to a new refresh token.
    ///
    /// The new issue time is strictly later than the old one even when two
    /// refreshes land in the same second.
    pub fn rotate(&mut self, now: DateTime<Utc>, ttl: TimeDelta) {
        let next = truncate_to_secs(now).max(self.issued_at + TimeDelta::seconds(1));
        self.issued_at = next;
        self.expires_at = next + ttl;
        self.last_active_at = next;
    }

    /// Does a refresh token with this `iat` belong to the current lineage?
    pub fn matches_token(&self, token_issued_at: i64) -> bool {
        self.issued_at.timestamp() == token_issued_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

fn truncate_to_secs(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(at.timestamp(), 0).unwrap_or(at)
}
