//! Shared fixtures for the use case tests

use std::sync::Arc;

use chrono::Utc;
use platform::client::ClientInfo;

use crate::application::config::AuthConfig;
use crate::application::login::{LoginInput, LoginUseCase};
use crate::application::token::{TokenPair, TokenService};
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    login::Login,
    user_password::{RawPassword, UserPassword},
};
use crate::infra::memory::{InMemoryAuthStore, RecordingEmailSender};

pub struct Fixture {
    pub store: Arc<InMemoryAuthStore>,
    pub mailer: Arc<RecordingEmailSender>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<AuthConfig>,
}

pub fn fixture() -> Fixture {
    let config = AuthConfig::development();
    Fixture {
        store: Arc::new(InMemoryAuthStore::default()),
        mailer: Arc::new(RecordingEmailSender::default()),
        tokens: Arc::new(TokenService::new(&config)),
        config: Arc::new(config),
    }
}

pub fn client() -> ClientInfo {
    ClientInfo::new(Some("192.0.2.10".parse().unwrap()), "test-agent")
}

impl Fixture {
    pub async fn confirmed_user(&self, login: &str, email: &str, password: &str) -> User {
        let raw = RawPassword::new(password.to_string()).unwrap();
        let user = User::confirmed(
            Login::new(login).unwrap(),
            Email::new(email).unwrap(),
            UserPassword::from_raw(&raw, self.config.pepper()).unwrap(),
            Utc::now(),
        );
        self.store.insert_user(&user).await.unwrap();
        user
    }

    pub async fn login(&self, login: &str, password: &str) -> TokenPair {
        LoginUseCase::new(
            self.store.clone(),
            self.store.clone(),
            self.tokens.clone(),
            self.config.clone(),
        )
        .execute(
            LoginInput {
                login_or_email: login.into(),
                password: password.into(),
            },
            client(),
        )
        .await
        .unwrap()
    }
}
