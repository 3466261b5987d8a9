//! Refresh Token Use Case
//!
//! Rotates the device session and issues a new token pair. The previous
//! refresh token of the device is rejected from then on.

use std::sync::Arc;

use chrono::Utc;

use crate::application::check_session::RefreshContext;
use crate::application::config::AuthConfig;
use crate::application::token::{TokenPair, TokenService};
use crate::domain::repository::DeviceSessionRepository;
use crate::error::{AuthError, AuthResult};

pub struct RefreshTokenUseCase<S>
where
    S: DeviceSessionRepository,
{
    session_repo: Arc<S>,
    tokens: Arc<TokenService>,
    config: Arc<AuthConfig>,
}

impl<S> RefreshTokenUseCase<S>
where
    S: DeviceSessionRepository,
{
    pub fn new(session_repo: Arc<S>, tokens: Arc<TokenService>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            tokens,
            config,
        }
    }

    pub async fn execute(&self, ctx: &RefreshContext) -> AuthResult<TokenPair> {
        let mut session = self
            .session_repo
            .find_session(&ctx.device_id)
            .await?
            .filter(|s| s.user_id == ctx.user_id)
            .ok_or(AuthError::SessionInvalid)?;

        let previous_issued_at = session.issued_at;
        let now = Utc::now();
        session.rotate(now, self.config.refresh_token_ttl());

        // Lost a race with a concurrent refresh of the same token
        if !self
            .session_repo
            .rotate_session(&session, previous_issued_at)
            .await?
        {
            return Err(AuthError::SessionInvalid);
        }

        let pair = self.tokens.issue_pair(
            &session.user_id,
            &session.device_id,
            now,
            session.issued_at,
            session.expires_at,
        )?;

        tracing::debug!(device_id = %session.device_id, "Refresh token rotated");

        Ok(pair)
    }
}
