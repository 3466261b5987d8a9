//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.
//! Method names are unique across traits so one store can implement all.

use chrono::{DateTime, Utc};
use kernel::id::{DeviceId, UserId};
use kernel::pagination::{Page, Paginated};

use crate::domain::entity::{device_session::DeviceSession, user::User};
use crate::domain::read_model::{DeviceView, MeView, UserFilter, UserView};
use crate::domain::value_object::{
    email::Email, expiring_code::ExpiringCode, login::Login, user_password::UserPassword,
};
use crate::error::AuthResult;

/// Which unique fields of a prospective user are already taken
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserConflicts {
    pub login_taken: bool,
    pub email_taken: bool,
}

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user; login and email must be unique
    async fn insert_user(&self, user: &User) -> AuthResult<()>;

    async fn find_user_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Exact login match or case-insensitive email match
    async fn find_user_by_login_or_email(&self, login_or_email: &str) -> AuthResult<Option<User>>;

    async fn find_user_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn find_user_by_confirmation_code(&self, code: &str) -> AuthResult<Option<User>>;

    async fn find_user_by_recovery_code(&self, code: &str) -> AuthResult<Option<User>>;

    async fn find_user_conflicts(&self, login: &Login, email: &Email)
    -> AuthResult<UserConflicts>;

    /// Mark the user confirmed if `code` is still its pending, unexpired
    /// confirmation code. `false` when the code was used or replaced meanwhile.
    async fn confirm_email(&self, user_id: &UserId, code: &str, now: DateTime<Utc>)
    -> AuthResult<bool>;

    /// Replace the pending confirmation code; `false` once the user is confirmed
    async fn replace_confirmation_code(&self, user_id: &UserId, code: &ExpiringCode)
    -> AuthResult<bool>;

    /// Store a recovery code, leaving every other column untouched
    async fn save_recovery_code(&self, user_id: &UserId, code: &ExpiringCode) -> AuthResult<()>;

    /// Set the password hash and consume `code` if it is still valid
    async fn reset_password(
        &self,
        user_id: &UserId,
        code: &str,
        password_hash: &UserPassword,
        now: DateTime<Utc>,
    ) -> AuthResult<bool>;

    /// Returns `false` when no such user existed
    async fn delete_user(&self, user_id: &UserId) -> AuthResult<bool>;
}

/// Read side for users
#[trait_variant::make(UserQueryRepository: Send)]
pub trait LocalUserQueryRepository {
    async fn list_users(&self, filter: &UserFilter, page: &Page)
    -> AuthResult<Paginated<UserView>>;

    async fn find_user_view(&self, user_id: &UserId) -> AuthResult<Option<UserView>>;

    async fn find_me_view(&self, user_id: &UserId) -> AuthResult<Option<MeView>>;
}

/// Device session repository trait
#[trait_variant::make(DeviceSessionRepository: Send)]
pub trait LocalDeviceSessionRepository {
    async fn insert_session(&self, session: &DeviceSession) -> AuthResult<()>;

    async fn find_session(&self, device_id: &DeviceId) -> AuthResult<Option<DeviceSession>>;

    /// Persist a rotated session only if its stored `issued_at` is still
    /// `previous_issued_at`. Returns `false` when another refresh won.
    async fn rotate_session(
        &self,
        session: &DeviceSession,
        previous_issued_at: DateTime<Utc>,
    ) -> AuthResult<bool>;

    /// Returns `false` when the session was already gone
    async fn delete_session(&self, device_id: &DeviceId) -> AuthResult<bool>;

    /// Delete every session of `user_id` except `keep`
    async fn delete_other_sessions(&self, user_id: &UserId, keep: &DeviceId) -> AuthResult<u64>;

    /// Active sessions of a user, most recently active first
    async fn list_device_views(&self, user_id: &UserId) -> AuthResult<Vec<DeviceView>>;

    /// Clean up expired sessions
    async fn delete_expired_sessions(&self) -> AuthResult<u64>;
}
