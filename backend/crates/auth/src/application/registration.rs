//! Registration Use Cases
//!
//! Self-registration with email confirmation, confirmation by code and
//! re-sending the confirmation email.

use std::sync::Arc;

use chrono::Utc;
use kernel::error::{app_error::AppError, field::FieldErrors};

use crate::application::config::AuthConfig;
use crate::application::email::{EmailMessage, EmailSender};
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    login::Login,
    user_password::{RawPassword, UserPassword},
};
use crate::error::AuthResult;

/// Input shared by registration and admin user creation
pub struct NewUserInput {
    pub login: String,
    pub password: String,
    pub email: String,
}

/// Validated fields of a new user
pub(crate) struct NewUserFields {
    pub login: Login,
    pub password: RawPassword,
    pub email: Email,
}

impl NewUserInput {
    /// Validate every field, reporting all failures at once
    pub(crate) fn validate(self) -> AuthResult<NewUserFields> {
        let mut errors = FieldErrors::new();
        let login = errors.check("login", Login::new(self.login));
        let password = errors.check("password", RawPassword::new(self.password));
        let email = errors.check("email", Email::new(self.email));

        let ((login, password), email) = errors.finish(login.zip(password).zip(email))?;
        Ok(NewUserFields {
            login,
            password,
            email,
        })
    }
}

/// Reject a login or email that already belongs to someone
pub(crate) async fn ensure_unique<U>(user_repo: &U, login: &Login, email: &Email) -> AuthResult<()>
where
    U: UserRepository,
{
    let conflicts = user_repo.find_user_conflicts(login, email).await?;

    let mut errors = FieldErrors::new();
    if conflicts.login_taken {
        errors.push("login", "Login is already taken");
    }
    if conflicts.email_taken {
        errors.push("email", "Email is already registered");
    }
    errors.finish(Some(()))?;
    Ok(())
}

/// Deliver a message without failing the surrounding flow; the user can
/// always ask for the email again.
pub(crate) async fn send_best_effort<M>(mailer: &M, message: EmailMessage)
where
    M: EmailSender,
{
    let to = message.to.clone();
    if let Err(e) = mailer.send(message).await {
        tracing::warn!(to = %to, error = %e, "Failed to send email");
    }
}

// ============================================================================
// Register
// ============================================================================

pub struct RegisterUseCase<U, M>
where
    U: UserRepository,
    M: EmailSender,
{
    user_repo: Arc<U>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<U, M> RegisterUseCase<U, M>
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

    pub async fn execute(&self, input: NewUserInput) -> AuthResult<()> {
        let fields = input.validate()?;
        ensure_unique(self.user_repo.as_ref(), &fields.login, &fields.email).await?;

        let password_hash = UserPassword::from_raw(&fields.password, self.config.pepper())?;
        let user = User::register(
            fields.login,
            fields.email,
            password_hash,
            Utc::now(),
            self.config.confirmation_code_ttl(),
        );
        self.user_repo.insert_user(&user).await?;

        if let Some(code) = user.confirmation_code() {
            let message = EmailMessage::registration_confirmation(
                &user.email,
                &self.config.frontend_url,
                &code.code,
            );
            send_best_effort(self.mailer.as_ref(), message).await;
        }

        tracing::info!(user_id = %user.user_id, login = %user.login, "User registered");
        Ok(())
    }
}

// ============================================================================
// Confirm
// ============================================================================

pub struct ConfirmRegistrationUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> ConfirmRegistrationUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, code: &str) -> AuthResult<()> {
        let rejected =
            || AppError::bad_request("Confirmation code is incorrect, expired or already applied")
                .with_field("code");

        let mut user = self
            .user_repo
            .find_user_by_confirmation_code(code)
            .await?
            .ok_or_else(rejected)?;

        let now = Utc::now();
        if !user.confirm(code, now) {
            return Err(rejected().into());
        }
        // a concurrent confirmation or resend may have won
        if !self.user_repo.confirm_email(&user.user_id, code, now).await? {
            return Err(rejected().into());
        }

        tracing::info!(user_id = %user.user_id, "Email confirmed");
        Ok(())
    }
}

// ============================================================================
// Resend
// ============================================================================

pub struct ResendConfirmationUseCase<U, M>
where
    U: UserRepository,
    M: EmailSender,
{
    user_repo: Arc<U>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<U, M> ResendConfirmationUseCase<U, M>
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
        let rejected = || {
            AppError::bad_request("Email is not registered or already confirmed").with_field("email")
        };

        let mut user = self
            .user_repo
            .find_user_by_email(&email)
            .await?
            .ok_or_else(rejected)?;

        let code = user
            .renew_confirmation_code(Utc::now(), self.config.confirmation_code_ttl())
            .cloned()
            .ok_or_else(rejected)?;
        if !self
            .user_repo
            .replace_confirmation_code(&user.user_id, &code)
            .await?
        {
            return Err(rejected().into());
        }

        let message = EmailMessage::registration_confirmation(
            &user.email,
            &self.config.frontend_url,
            &code.code,
        );
        send_best_effort(self.mailer.as_ref(), message).await;

        tracing::info!(user_id = %user.user_id, "Confirmation email re-sent");
        Ok(())
    }
}
