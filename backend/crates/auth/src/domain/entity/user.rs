//! User Entity
//!
//! Account record with its email-confirmation and password-recovery state.

use chrono::{DateTime, TimeDelta, Utc};
use kernel::id::UserId;

use crate::domain::value_object::{
    email::Email, expiring_code::ExpiringCode, login::Login, user_password::UserPassword,
};

/// Email confirmation state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailConfirmation {
    /// Waiting for the code sent by email
    Pending(ExpiringCode),
    Confirmed,
}

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub login: Login,
    pub email: Email,
    pub password_hash: UserPassword,
    pub created_at: DateTime<Utc>,
    pub confirmation: EmailConfirmation,
    /// Outstanding password-recovery code, if any
    pub recovery: Option<ExpiringCode>,
}

impl User {
    /// Self-registered user; must confirm the email address
    pub fn register(
        login: Login,
        email: Email,
        password_hash: UserPassword,
        now: DateTime<Utc>,
        code_ttl: TimeDelta,
    ) -> Self {
        Self {
            user_id: UserId::new(),
            login,
            email,
            password_hash,
            created_at: now,
            confirmation: EmailConfirmation::Pending(ExpiringCode::issue(now, code_ttl)),
            recovery: None,
        }
    }

    /// User created by an administrator; already confirmed
    pub fn confirmed(
        login: Login,
        email: Email,
        password_hash: UserPassword,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: UserId::new(),
            login,
            email,
            password_hash,
            created_at: now,
            confirmation: EmailConfirmation::Confirmed,
            recovery: None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self.confirmation, EmailConfirmation::Confirmed)
    }

    /// Current confirmation code, if still pending
    pub fn confirmation_code(&self) -> Option<&ExpiringCode> {
        match &self.confirmation {
            EmailConfirmation::Pending(code) => Some(code),
            EmailConfirmation::Confirmed => None,
        }
    }

    /// Mark confirmed if `code` matches, is unexpired and the user is pending.
    ///
    /// Returns `false` (and leaves the user untouched) otherwise.
    pub fn confirm(&mut self, code: &str, now: DateTime<Utc>) -> bool {
        match &self.confirmation {
            EmailConfirmation::Pending(pending) if pending.accepts(code, now) => {
                self.confirmation = EmailConfirmation::Confirmed;
                true
            }
            _ => false,
        }
    }

    /// Replace the pending confirmation code. Returns `None` when the user is
    /// already confirmed.
    pub fn renew_confirmation_code(
        &mut self,
        now: DateTime<Utc>,
        ttl: TimeDelta,
    ) -> Option<&ExpiringCode> {
        if self.is_confirmed() {
            return None;
        }
        self.confirmation = EmailConfirmation::Pending(ExpiringCode::issue(now, ttl));
        self.confirmation_code()
    }

    /// Issue a password-recovery code, replacing any previous one
    pub fn start_recovery(&mut self, now: DateTime<Utc>, ttl: TimeDelta) -> &ExpiringCode {
        self.recovery.insert(ExpiringCode::issue(now, ttl))
    }

    /// Consume a recovery code and set the new password hash
    pub fn reset_password(
        &mut self,
        code: &str,
        new_hash: UserPassword,
        now: DateTime<Utc>,
    ) -> bool {
        match &self.recovery {
            Some(recovery) if recovery.accepts(code, now) => {
                self.password_hash = new_hash;
                self.recovery = None;
                true
            }
            _ => false,
        }
    }
}
