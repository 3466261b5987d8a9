//! Login Use Case
//!
//! Verifies credentials, opens a device session and issues a token pair.

use std::sync::Arc;

use chrono::Utc;
use platform::client::ClientInfo;

use crate::application::config::AuthConfig;
use crate::application::token::{TokenPair, TokenService};
use crate::domain::entity::device_session::DeviceSession;
use crate::domain::repository::{DeviceSessionRepository, UserRepository};
use crate::domain::value_object::user_password::RawPassword;
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    /// Login or email
    pub login_or_email: String,
    pub password: String,
}

/// Login use case
pub struct LoginUseCase<U, S>
where
    U: UserRepository,
    S: DeviceSessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    tokens: Arc<TokenService>,
    config: Arc<AuthConfig>,
}

impl<U, S> LoginUseCase<U, S>
where
    U: UserRepository,
    S: DeviceSessionRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        tokens: Arc<TokenService>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            tokens,
            config,
        }
    }

    pub async fn execute(&self, input: LoginInput, client: ClientInfo) -> AuthResult<TokenPair> {
        let identifier = input.login_or_email.trim();
        if identifier.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .user_repo
            .find_user_by_login_or_email(identifier)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let attempt = RawPassword::attempt(input.password);
        if !user.password_hash.verify(&attempt, self.config.pepper()) {
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        let session =
            DeviceSession::start(user.user_id, &client, now, self.config.refresh_token_ttl());
        self.session_repo.insert_session(&session).await?;

        let pair = self.tokens.issue_pair(
            &user.user_id,
            &session.device_id,
            now,
            session.issued_at,
            session.expires_at,
        )?;

        tracing::info!(
            user_id = %user.user_id,
            device_id = %session.device_id,
            ip = %session.ip,
            "User logged in"
        );

        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{client, fixture};

    #[tokio::test]
    async fn test_login_by_login_and_by_email() {
        let fx = fixture();
        fx.confirmed_user("alice", "alice@example.com", "qwerty1").await;
        let use_case = LoginUseCase::new(
            fx.store.clone(),
            fx.store.clone(),
            fx.tokens.clone(),
            fx.config.clone(),
        );

        let by_login = use_case
            .execute(
                LoginInput {
                    login_or_email: "alice".into(),
                    password: "qwerty1".into(),
                },
                client(),
            )
            .await
            .unwrap();
        let user_id = fx.tokens.verify_access(&by_login.access_token).unwrap();

        let by_email = use_case
            .execute(
                LoginInput {
                    login_or_email: "Alice@Example.com".into(),
                    password: "qwerty1".into(),
                },
                client(),
            )
            .await
            .unwrap();
        let refresh = fx.tokens.verify_refresh(&by_email.refresh_token).unwrap();
        assert_eq!(refresh.user_id, user_id);

        // each login is its own device
        assert_eq!(fx.store.session_count(), 2);
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let fx = fixture();
        fx.confirmed_user("alice", "alice@example.com", "qwerty1").await;
        let use_case = LoginUseCase::new(
            fx.store.clone(),
            fx.store.clone(),
            fx.tokens.clone(),
            fx.config.clone(),
        );

        let result = use_case
            .execute(
                LoginInput {
                    login_or_email: "alice".into(),
                    password: "qwerty2".into(),
                },
                client(),
            )
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));

        let result = use_case
            .execute(
                LoginInput {
                    login_or_email: "nobody".into(),
                    password: "qwerty1".into(),
                },
                client(),
            )
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert_eq!(fx.store.session_count(), 0);
    }
}
