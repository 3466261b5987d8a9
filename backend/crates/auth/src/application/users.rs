//! Admin User Management Use Cases

use std::sync::Arc;

use chrono::Utc;
use kernel::id::UserId;

use crate::application::config::AuthConfig;
use crate::application::registration::{NewUserInput, ensure_unique};
use crate::domain::entity::user::User;
use crate::domain::read_model::UserView;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_password::UserPassword;
use crate::error::{AuthError, AuthResult};

/// Create a user on behalf of an administrator. No confirmation email is
/// sent; the account is confirmed immediately.
pub struct CreateUserUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> CreateUserUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, input: NewUserInput) -> AuthResult<UserView> {
        let fields = input.validate()?;
        ensure_unique(self.user_repo.as_ref(), &fields.login, &fields.email).await?;

        let password_hash = UserPassword::from_raw(&fields.password, self.config.pepper())?;
        let user = User::confirmed(fields.login, fields.email, password_hash, Utc::now());
        self.user_repo.insert_user(&user).await?;

        tracing::info!(user_id = %user.user_id, login = %user.login, "User created by admin");

        Ok(UserView {
            id: user.user_id,
            login: user.login.as_str().to_string(),
            email: user.email.as_str().to_string(),
            created_at: user.created_at,
        })
    }
}

pub struct DeleteUserUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> DeleteUserUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// Sessions go with the user (cascade)
    pub async fn execute(&self, user_id: &str) -> AuthResult<()> {
        let user_id = UserId::parse_str(user_id).ok_or(AuthError::UserNotFound)?;

        if !self.user_repo.delete_user(&user_id).await? {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!(user_id = %user_id, "User deleted by admin");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::fixture;

    fn input(login: &str, email: &str) -> NewUserInput {
        NewUserInput {
            login: login.into(),
            password: "qwerty1".into(),
            email: email.into(),
        }
    }

    #[tokio::test]
    async fn test_create_confirmed_user() {
        let fx = fixture();
        let create = CreateUserUseCase::new(fx.store.clone(), fx.config.clone());

        let view = create.execute(input("carol", "carol@example.com")).await.unwrap();
        assert_eq!(view.login, "carol");

        let user = fx.store.find_user_by_id(&view.id).await.unwrap().unwrap();
        assert!(user.is_confirmed());
        assert!(fx.mailer.messages().is_empty());

        let err = create
            .execute(input("carol", "carol2@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.into_app_error().field_errors()[0].field, "login");
    }

    #[tokio::test]
    async fn test_delete_user() {
        let fx = fixture();
        let user = fx.confirmed_user("carol", "carol@example.com", "qwerty1").await;
        fx.login("carol", "qwerty1").await;
        let delete = DeleteUserUseCase::new(fx.store.clone());

        delete.execute(&user.user_id.to_string()).await.unwrap();
        assert_eq!(fx.store.session_count(), 0);

        assert!(matches!(
            delete.execute(&user.user_id.to_string()).await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            delete.execute("123").await,
            Err(AuthError::UserNotFound)
        ));
    }
}
