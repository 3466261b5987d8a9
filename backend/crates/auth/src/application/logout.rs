//! Logout Use Case
//!
//! Ends the device session behind the presented refresh token.

use std::sync::Arc;

use crate::application::check_session::RefreshContext;
use crate::domain::repository::DeviceSessionRepository;
use crate::error::AuthResult;

pub struct LogoutUseCase<S>
where
    S: DeviceSessionRepository,
{
    session_repo: Arc<S>,
}

impl<S> LogoutUseCase<S>
where
    S: DeviceSessionRepository,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    /// Idempotent: a session that is already gone is not an error
    pub async fn execute(&self, ctx: &RefreshContext) -> AuthResult<()> {
        let deleted = self.session_repo.delete_session(&ctx.device_id).await?;

        tracing::info!(
            user_id = %ctx.user_id,
            device_id = %ctx.device_id,
            deleted,
            "User logged out"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::check_session::CheckSessionUseCase;
    use crate::application::refresh::RefreshTokenUseCase;
    use crate::application::test_support::fixture;
    use crate::error::AuthError;

    #[tokio::test]
    async fn test_logout_ends_session() {
        let fx = fixture();
        fx.confirmed_user("alice", "alice@example.com", "qwerty1").await;
        let pair = fx.login("alice", "qwerty1").await;

        let check = CheckSessionUseCase::new(fx.store.clone(), fx.tokens.clone());
        let ctx = check.execute(&pair.refresh_token).await.unwrap();

        let logout = LogoutUseCase::new(fx.store.clone());
        logout.execute(&ctx).await.unwrap();
        // second call is a no-op
        logout.execute(&ctx).await.unwrap();

        assert!(matches!(
            check.execute(&pair.refresh_token).await,
            Err(AuthError::SessionInvalid)
        ));
        let refresh = RefreshTokenUseCase::new(fx.store.clone(), fx.tokens.clone(), fx.config.clone());
        assert!(refresh.execute(&ctx).await.is_err());
    }
}
