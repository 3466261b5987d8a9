//! Password Recovery Use Cases

use std::sync::Arc;

use chrono::Utc;
use kernel::error::{app_error::AppError, field::FieldErrors};

use crate::application::config::AuthConfig;
use crate::application::email::{EmailMessage, EmailSender};
use crate::application::registration::send_best_effort;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::AuthResult;

/// Mails a recovery code. Succeeds for unknown addresses too, so the
/// endpoint cannot be used to discover which emails are registered.
pub struct PasswordRecoveryUseCase<U, M>
where
    U: UserRepository,
    M: EmailSender,
{
    user_repo: Arc<U>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<U, M> PasswordRecoveryUseCase<U, M>
where
    U: UserRepository,
    M: EmailSender,
{
    pub fn new(user_repo: Arc<U>, mailer: Arc<M>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            mailer,
            config,
        }
    }

    pub async fn execute(&self, email: String) -> AuthResult<()> {
        let email = Email::new(email).map_err(|e| e.with_field("email"))?;

        let Some(mut user) = self.user_repo.find_user_by_email(&email).await? else {
            tracing::debug!("Password recovery requested for unknown email");
            return Ok(());
        };

        let code = user
            .start_recovery(Utc::now(), self.config.confirmation_code_ttl())
            .clone();
        self.user_repo
            .save_recovery_code(&user.user_id, &code)
            .await?;

        let message =
            EmailMessage::password_recovery(&user.email, &self.config.frontend_url, &code.code);
        send_best_effort(self.mailer.as_ref(), message).await;

        tracing::info!(user_id = %user.user_id, "Password recovery started");
        Ok(())
    }
}

pub struct NewPasswordInput {
    pub new_password: String,
    pub recovery_code: String,
}

pub struct NewPasswordUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> NewPasswordUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, input: NewPasswordInput) -> AuthResult<()> {
        let mut errors = FieldErrors::new();
        let password = errors.check("newPassword", RawPassword::new(input.new_password));
        let user = match self
            .user_repo
            .find_user_by_recovery_code(&input.recovery_code)
            .await?
        {
            Some(user) => Some(user),
            None => {
                errors.push("recoveryCode", "Recovery code is incorrect or expired");
                None
            }
        };
        let (password, mut user) = errors.finish(password.zip(user))?;

        let rejected = || {
            AppError::bad_request("Recovery code is incorrect or expired").with_field("recoveryCode")
        };
        let new_hash = UserPassword::from_raw(&password, self.config.pepper())?;
        let now = Utc::now();
        if !user.reset_password(&input.recovery_code, new_hash, now) {
            return Err(rejected().into());
        }
        // the code may have been consumed or replaced since it was read
        if !self
            .user_repo
            .reset_password(&user.user_id, &input.recovery_code, &user.password_hash, now)
            .await?
        {
            return Err(rejected().into());
        }

        tracing::info!(user_id = %user.user_id, "Password changed via recovery");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::login::{LoginInput, LoginUseCase};
    use crate::application::test_support::{client, fixture};
    use crate::error::AuthError;
    use chrono::TimeDelta;

    fn fields_of(err: AuthError) -> Vec<String> {
        err.into_app_error()
            .into_field_errors()
            .into_iter()
            .map(|e| e.field)
            .collect()
    }

    #[tokio::test]
    async fn test_recover_and_set_new_password() {
        let fx = fixture();
        fx.confirmed_user("alice", "alice@example.com", "qwerty1").await;

        let recovery =
            PasswordRecoveryUseCase::new(fx.store.clone(), fx.mailer.clone(), fx.config.clone());
        recovery.execute("alice@example.com".into()).await.unwrap();
        let code = fx.mailer.last_code().unwrap();

        let new_password = NewPasswordUseCase::new(fx.store.clone(), fx.config.clone());
        new_password
            .execute(NewPasswordInput {
                new_password: "brandnew1".into(),
                recovery_code: code.clone(),
            })
            .await
            .unwrap();

        let login = LoginUseCase::new(
            fx.store.clone(),
            fx.store.clone(),
            fx.tokens.clone(),
            fx.config.clone(),
        );
        let old = login
            .execute(
                LoginInput {
                    login_or_email: "alice".into(),
                    password: "qwerty1".into(),
                },
                client(),
            )
            .await;
        assert!(matches!(old, Err(AuthError::InvalidCredentials)));
        let new = login
            .execute(
                LoginInput {
                    login_or_email: "alice".into(),
                    password: "brandnew1".into(),
                },
                client(),
            )
            .await;
        assert!(new.is_ok());

        // code is single-use
        let err = new_password
            .execute(NewPasswordInput {
                new_password: "another1".into(),
                recovery_code: code,
            })
            .await
            .unwrap_err();
        assert_eq!(fields_of(err), vec!["recoveryCode"]);
    }

    #[tokio::test]
    async fn test_unknown_email_is_silent() {
        let fx = fixture();
        let recovery =
            PasswordRecoveryUseCase::new(fx.store.clone(), fx.mailer.clone(), fx.config.clone());
        recovery.execute("ghost@example.com".into()).await.unwrap();
        assert!(fx.mailer.messages().is_empty());

        let err = recovery.execute("not-an-email".into()).await.unwrap_err();
        assert_eq!(fields_of(err), vec!["email"]);
    }

    #[tokio::test]
    async fn test_expired_recovery_code() {
        let fx = fixture();
        let mut user = fx.confirmed_user("alice", "alice@example.com", "qwerty1").await;
        let code = user
            .start_recovery(Utc::now() - TimeDelta::hours(2), TimeDelta::hours(1))
            .code
            .clone();
        fx.store.put_user(&user);

        let new_password = NewPasswordUseCase::new(fx.store.clone(), fx.config.clone());
        let err = new_password
            .execute(NewPasswordInput {
                new_password: "brandnew1".into(),
                recovery_code: code,
            })
            .await
            .unwrap_err();
        assert_eq!(fields_of(err), vec!["recoveryCode"]);
    }

    #[tokio::test]
    async fn test_weak_password_and_bad_code_both_reported() {
        let fx = fixture();
        let new_password = NewPasswordUseCase::new(fx.store.clone(), fx.config.clone());
        let err = new_password
            .execute(NewPasswordInput {
                new_password: "123".into(),
                recovery_code: "nope".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(fields_of(err), vec!["newPassword", "recoveryCode"]);
    }

    #[tokio::test]
    async fn test_recovery_does_not_undo_confirmation() {
        use crate::application::registration::{
            ConfirmRegistrationUseCase, NewUserInput, RegisterUseCase,
        };

        let fx = fixture();
        RegisterUseCase::new(fx.store.clone(), fx.mailer.clone(), fx.config.clone())
            .execute(NewUserInput {
                login: "bob".into(),
                password: "qwerty1".into(),
                email: "bob@example.com".into(),
            })
            .await
            .unwrap();
        let confirmation_code = fx.mailer.last_code().unwrap();

        // recovery read the user before the confirmation was committed
        let mut stale = fx
            .store
            .find_user_by_login_or_email("bob")
            .await
            .unwrap()
            .unwrap();
        ConfirmRegistrationUseCase::new(fx.store.clone())
            .execute(&confirmation_code)
            .await
            .unwrap();

        let recovery = stale.start_recovery(Utc::now(), TimeDelta::hours(1)).clone();
        fx.store
            .save_recovery_code(&stale.user_id, &recovery)
            .await
            .unwrap();

        let user = fx
            .store
            .find_user_by_login_or_email("bob")
            .await
            .unwrap()
            .unwrap();
        assert!(user.is_confirmed());
        assert_eq!(user.recovery.map(|c| c.code), Some(recovery.code));
    }

    #[tokio::test]
    async fn test_recovery_code_is_consumed_once() {
        let fx = fixture();
        let mut user = fx.confirmed_user("alice", "alice@example.com", "qwerty1").await;
        let code = user.start_recovery(Utc::now(), TimeDelta::hours(1)).clone();
        fx.store.save_recovery_code(&user.user_id, &code).await.unwrap();

        let hash = user.password_hash.clone();
        let now = Utc::now();
        assert!(
            fx.store
                .reset_password(&user.user_id, &code.code, &hash, now)
                .await
                .unwrap()
        );
        assert!(
            !fx.store
                .reset_password(&user.user_id, &code.code, &hash, now)
                .await
                .unwrap()
        );
    }
}
