//! Expiring Code Value Object
//!
//! Single-use code mailed to the user (email confirmation, password
//! recovery). A code is only usable before `expires_at`.

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiringCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl ExpiringCode {
    /// Issue a fresh random code valid for `ttl`
    pub fn issue(now: DateTime<Utc>, ttl: TimeDelta) -> Self {
        Self {
            code: Uuid::new_v4().to_string(),
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// True when `candidate` is this code and it has not expired
    pub fn accepts(&self, candidate: &str, now: DateTime<Utc>) -> bool {
        self.code == candidate && !self.is_expired(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_until_expiry() {
        let now = Utc::now();
        let code = ExpiringCode::issue(now, TimeDelta::hours(1));

        assert!(code.accepts(&code.code, now));
        assert!(code.accepts(&code.code, now + TimeDelta::minutes(59)));
        assert!(!code.accepts(&code.code, now + TimeDelta::hours(1)));
        assert!(!code.accepts("other", now));
    }

    #[test]
    fn test_codes_are_unique() {
        let now = Utc::now();
        let a = ExpiringCode::issue(now, TimeDelta::hours(1));
        let b = ExpiringCode::issue(now, TimeDelta::hours(1));
        assert_ne!(a.code, b.code);
    }
}
