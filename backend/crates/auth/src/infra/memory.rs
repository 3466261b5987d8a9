//! In-memory repositories used by the use case tests

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use kernel::id::{DeviceId, UserId};
use kernel::pagination::{Page, Paginated, SortDirection};

use crate::application::email::{EmailMessage, EmailSender};
use crate::domain::entity::device_session::DeviceSession;
use crate::domain::entity::user::{EmailConfirmation, User};
use crate::domain::read_model::{DeviceView, MeView, UserFilter, UserView};
use crate::domain::repository::{
    DeviceSessionRepository, UserConflicts, UserQueryRepository, UserRepository,
};
use crate::domain::value_object::{
    email::Email, expiring_code::ExpiringCode, login::Login, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    sessions: HashMap<DeviceId, DeviceSession>,
}

#[derive(Clone, Default)]
pub struct InMemoryAuthStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryAuthStore {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn edit_session(&self, device_id: &DeviceId, edit: impl FnOnce(&mut DeviceSession)) {
        if let Some(session) = self.lock().sessions.get_mut(device_id) {
            edit(session);
        }
    }

    pub fn remove_session(&self, device_id: &DeviceId) {
        self.lock().sessions.remove(device_id);
    }

    /// Overwrite a stored user as is
    pub fn put_user(&self, user: &User) {
        self.lock().users.insert(user.user_id, user.clone());
    }

    fn find_user(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
        self.lock().users.values().find(|u| pred(u)).cloned()
    }
}

fn user_view(user: &User) -> UserView {
    UserView {
        id: user.user_id,
        login: user.login.as_str().to_string(),
        email: user.email.as_str().to_string(),
        created_at: user.created_at,
    }
}

fn contains_ci(haystack: &str, needle: &Option<String>) -> bool {
    needle
        .as_deref()
        .is_some_and(|n| haystack.to_lowercase().contains(&n.to_lowercase()))
}

impl UserRepository for InMemoryAuthStore {
    async fn insert_user(&self, user: &User) -> AuthResult<()> {
        let mut state = self.lock();
        if state
            .users
            .values()
            .any(|u| u.login == user.login || u.email == user.email)
        {
            return Err(AuthError::Internal("unique violation".into()));
        }
        state.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_user_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.lock().users.get(user_id).cloned())
    }

    async fn find_user_by_login_or_email(&self, login_or_email: &str) -> AuthResult<Option<User>> {
        let email = login_or_email.to_lowercase();
        Ok(self.find_user(|u| u.login.as_str() == login_or_email || u.email.as_str() == email))
    }

    async fn find_user_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self.find_user(|u| &u.email == email))
    }

    async fn find_user_by_confirmation_code(&self, code: &str) -> AuthResult<Option<User>> {
        Ok(self.find_user(|u| u.confirmation_code().is_some_and(|c| c.code == code)))
    }

    async fn find_user_by_recovery_code(&self, code: &str) -> AuthResult<Option<User>> {
        Ok(self.find_user(|u| u.recovery.as_ref().is_some_and(|c| c.code == code)))
    }

    async fn find_user_conflicts(
        &self,
        login: &Login,
        email: &Email,
    ) -> AuthResult<UserConflicts> {
        let state = self.lock();
        Ok(UserConflicts {
            login_taken: state.users.values().any(|u| &u.login == login),
            email_taken: state.users.values().any(|u| &u.email == email),
        })
    }

    async fn confirm_email(
        &self,
        user_id: &UserId,
        code: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<bool> {
        Ok(self
            .lock()
            .users
            .get_mut(user_id)
            .is_some_and(|u| u.confirm(code, now)))
    }

    async fn replace_confirmation_code(
        &self,
        user_id: &UserId,
        code: &ExpiringCode,
    ) -> AuthResult<bool> {
        let mut state = self.lock();
        match state.users.get_mut(user_id) {
            Some(user) if !user.is_confirmed() => {
                user.confirmation = EmailConfirmation::Pending(code.clone());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn save_recovery_code(&self, user_id: &UserId, code: &ExpiringCode) -> AuthResult<()> {
        if let Some(user) = self.lock().users.get_mut(user_id) {
            user.recovery = Some(code.clone());
        }
        Ok(())
    }

    async fn reset_password(
        &self,
        user_id: &UserId,
        code: &str,
        password_hash: &UserPassword,
        now: DateTime<Utc>,
    ) -> AuthResult<bool> {
        Ok(self
            .lock()
            .users
            .get_mut(user_id)
            .is_some_and(|u| u.reset_password(code, password_hash.clone(), now)))
    }

    async fn delete_user(&self, user_id: &UserId) -> AuthResult<bool> {
        let mut state = self.lock();
        state.sessions.retain(|_, s| &s.user_id != user_id);
        Ok(state.users.remove(user_id).is_some())
    }
}

impl UserQueryRepository for InMemoryAuthStore {
    async fn list_users(
        &self,
        filter: &UserFilter,
        page: &Page,
    ) -> AuthResult<Paginated<UserView>> {
        let state = self.lock();
        let unfiltered =
            filter.search_login_term.is_none() && filter.search_email_term.is_none();
        let mut users: Vec<&User> = state
            .users
            .values()
            .filter(|u| {
                unfiltered
                    || contains_ci(u.login.as_str(), &filter.search_login_term)
                    || contains_ci(u.email.as_str(), &filter.search_email_term)
            })
            .collect();

        users.sort_by(|a, b| {
            let ord = match page.sort_column {
                "login" => a.login.as_str().cmp(b.login.as_str()),
                "email" => a.email.as_str().cmp(b.email.as_str()),
                _ => a.created_at.cmp(&b.created_at),
            };
            match page.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });

        let total = users.len() as u64;
        let items = users
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .map(user_view)
            .collect();
        Ok(Paginated::new(items, total, page))
    }

    async fn find_user_view(&self, user_id: &UserId) -> AuthResult<Option<UserView>> {
        Ok(self.lock().users.get(user_id).map(user_view))
    }

    async fn find_me_view(&self, user_id: &UserId) -> AuthResult<Option<MeView>> {
        Ok(self.lock().users.get(user_id).map(|u| MeView {
            email: u.email.as_str().to_string(),
            login: u.login.as_str().to_string(),
            user_id: u.user_id,
        }))
    }
}

impl DeviceSessionRepository for InMemoryAuthStore {
    async fn insert_session(&self, session: &DeviceSession) -> AuthResult<()> {
        self.lock().sessions.insert(session.device_id, session.clone());
        Ok(())
    }

    async fn find_session(&self, device_id: &DeviceId) -> AuthResult<Option<DeviceSession>> {
        Ok(self.lock().sessions.get(device_id).cloned())
    }

    async fn rotate_session(
        &self,
        session: &DeviceSession,
        previous_issued_at: DateTime<Utc>,
    ) -> AuthResult<bool> {
        let mut state = self.lock();
        match state.sessions.get_mut(&session.device_id) {
            Some(stored) if stored.issued_at == previous_issued_at => {
                *stored = session.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_session(&self, device_id: &DeviceId) -> AuthResult<bool> {
        Ok(self.lock().sessions.remove(device_id).is_some())
    }

    async fn delete_other_sessions(&self, user_id: &UserId, keep: &DeviceId) -> AuthResult<u64> {
        let mut state = self.lock();
        let before = state.sessions.len();
        state
            .sessions
            .retain(|id, s| &s.user_id != user_id || id == keep);
        Ok((before - state.sessions.len()) as u64)
    }

    async fn list_device_views(&self, user_id: &UserId) -> AuthResult<Vec<DeviceView>> {
        let now = Utc::now();
        let state = self.lock();
        let mut sessions: Vec<&DeviceSession> = state
            .sessions
            .values()
            .filter(|s| &s.user_id == user_id && !s.is_expired(now))
            .collect();
        sessions.sort_by(|a, b| match b.last_active_at.cmp(&a.last_active_at) {
            Ordering::Equal => a.device_id.to_string().cmp(&b.device_id.to_string()),
            other => other,
        });

        Ok(sessions
            .into_iter()
            .map(|s| DeviceView {
                ip: s.ip.clone(),
                title: s.device_name.clone(),
                last_active_date: s.last_active_at,
                device_id: s.device_id,
            })
            .collect())
    }

    async fn delete_expired_sessions(&self) -> AuthResult<u64> {
        let now = Utc::now();
        let mut state = self.lock();
        let before = state.sessions.len();
        state.sessions.retain(|_, s| !s.is_expired(now));
        Ok((before - state.sessions.len()) as u64)
    }
}

/// Keeps every message instead of sending it
#[derive(Clone, Default)]
pub struct RecordingEmailSender {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl RecordingEmailSender {
    pub fn messages(&self) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    pub fn last_code(&self) -> Option<String> {
        self.messages().last().map(|m| m.code.clone())
    }
}

impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: EmailMessage) -> AuthResult<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message);
        }
        Ok(())
    }
}
