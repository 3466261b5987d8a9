//! Application Layer
//!
//! Use cases and application services.

pub mod check_session;
pub mod config;
pub mod devices;
pub mod email;
pub mod login;
pub mod logout;
pub mod password_recovery;
pub mod refresh;
pub mod registration;
pub mod token;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports
pub use check_session::{CheckSessionUseCase, RefreshContext};
pub use config::AuthConfig;
pub use devices::DevicesUseCase;
pub use email::{EmailMessage, EmailSender, LoggingEmailSender};
pub use login::{LoginInput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use password_recovery::{NewPasswordInput, NewPasswordUseCase, PasswordRecoveryUseCase};
pub use refresh::RefreshTokenUseCase;
pub use registration::{
    ConfirmRegistrationUseCase, NewUserInput, RegisterUseCase, ResendConfirmationUseCase,
};
pub use token::{TokenPair, TokenService};
pub use users::{CreateUserUseCase, DeleteUserUseCase};
