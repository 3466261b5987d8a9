//! Check Refresh Session Use Case
//!
//! Resolves a refresh token to the device session it belongs to.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{DeviceId, UserId};

use crate::application::token::TokenService;
use crate::domain::repository::DeviceSessionRepository;
use crate::error::{AuthError, AuthResult};

/// Principal of a request authenticated by refresh token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshContext {
    pub user_id: UserId,
    pub device_id: DeviceId,
}

pub struct CheckSessionUseCase<S>
where
    S: DeviceSessionRepository,
{
    session_repo: Arc<S>,
    tokens: Arc<TokenService>,
}

impl<S> CheckSessionUseCase<S>
where
    S: DeviceSessionRepository,
{
    pub fn new(session_repo: Arc<S>, tokens: Arc<TokenService>) -> Self {
        Self {
            session_repo,
            tokens,
        }
    }

    /// The token must be well-signed, unexpired, and still the current token
    /// of a live session owned by its subject.
    pub async fn execute(&self, refresh_token: &str) -> AuthResult<RefreshContext> {
        let token = self.tokens.verify_refresh(refresh_token)?;

        let session = self
            .session_repo
            .find_session(&token.device_id)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        if session.user_id != token.user_id
            || !session.matches_token(token.issued_at)
            || session.is_expired(Utc::now())
        {
            tracing::debug!(device_id = %token.device_id, "Stale or foreign refresh token");
            return Err(AuthError::SessionInvalid);
        }

        Ok(RefreshContext {
            user_id: session.user_id,
            device_id: session.device_id,
        })
    }

    /// Same as [`Self::execute`] but never errors on a bad token
    pub async fn is_valid(&self, refresh_token: &str) -> bool {
        self.execute(refresh_token).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::fixture;
    use chrono::TimeDelta;

    #[tokio::test]
    async fn test_current_token_accepted() {
        let fx = fixture();
        let user = fx.confirmed_user("alice", "alice@example.com", "qwerty1").await;
        let pair = fx.login("alice", "qwerty1").await;

        let use_case = CheckSessionUseCase::new(fx.store.clone(), fx.tokens.clone());
        let ctx = use_case.execute(&pair.refresh_token).await.unwrap();
        assert_eq!(ctx.user_id, user.user_id);
    }

    #[tokio::test]
    async fn test_expired_session_rejected() {
        let fx = fixture();
        fx.confirmed_user("alice", "alice@example.com", "qwerty1").await;
        let pair = fx.login("alice", "qwerty1").await;
        let token = fx.tokens.verify_refresh(&pair.refresh_token).unwrap();

        fx.store
            .edit_session(&token.device_id, |s| s.expires_at = Utc::now() - TimeDelta::seconds(1));

        let use_case = CheckSessionUseCase::new(fx.store.clone(), fx.tokens.clone());
        assert!(!use_case.is_valid(&pair.refresh_token).await);
    }

    #[tokio::test]
    async fn test_garbage_rejected() {
        let fx = fixture();
        let use_case = CheckSessionUseCase::new(fx.store.clone(), fx.tokens.clone());
        assert!(matches!(
            use_case.execute("garbage").await,
            Err(AuthError::SessionInvalid)
        ));
    }
}
