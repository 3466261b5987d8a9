//! HTTP Handlers

use std::sync::Arc;

use axum::Extension;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::extract::Json;
use kernel::pagination::Paginated;
use platform::cookie::{delete_cookie_header, set_cookie_header};

use crate::application::config::AuthConfig;
use crate::application::email::EmailSender;
use crate::application::token::{TokenPair, TokenService};
use crate::application::{
    ConfirmRegistrationUseCase, CreateUserUseCase, DeleteUserUseCase, DevicesUseCase, LoginInput,
    LoginUseCase, LogoutUseCase, NewPasswordInput, NewPasswordUseCase, NewUserInput,
    PasswordRecoveryUseCase, RefreshContext, RefreshTokenUseCase, RegisterUseCase,
    ResendConfirmationUseCase,
};
use crate::domain::read_model::{DeviceView, MeView, UserFilter, UserView};
use crate::domain::repository::{DeviceSessionRepository, UserQueryRepository, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AccessTokenResponse, CodeRequest, EmailRequest, LoginRequest, NewPasswordRequest,
    NewUserRequest, USER_SORT_COLUMNS, UsersQuery,
};
use crate::presentation::middleware::{AccessGuard, ClientMeta, CurrentUser, RateLimiter};

/// Everything the auth store must provide
pub trait AuthStore:
    UserRepository + UserQueryRepository + DeviceSessionRepository + Clone + Send + Sync + 'static
{
}

impl<T> AuthStore for T where
    T: UserRepository
        + UserQueryRepository
        + DeviceSessionRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}

pub trait Mailer: EmailSender + Clone + Send + Sync + 'static {}

impl<T> Mailer for T where T: EmailSender + Clone + Send + Sync + 'static {}

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R, M>
where
    R: AuthStore,
    M: Mailer,
{
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<AuthConfig>,
    pub limiter: RateLimiter,
}

impl<R, M> AuthAppState<R, M>
where
    R: AuthStore,
    M: Mailer,
{
    pub fn new(repo: R, mailer: M, config: AuthConfig) -> Self {
        let limiter = RateLimiter::new(config.rate_limit.clone(), config.trust_forwarded_for);
        Self {
            repo: Arc::new(repo),
            mailer: Arc::new(mailer),
            tokens: Arc::new(TokenService::new(&config)),
            config: Arc::new(config),
            limiter,
        }
    }

    /// State for the bearer and admin guards, shared with other routers
    pub fn access_guard(&self) -> AccessGuard {
        AccessGuard::new(self.tokens.clone(), self.config.clone())
    }
}

/// 200 with the access token in the body and the refresh token in a cookie
fn token_response(config: &AuthConfig, pair: TokenPair) -> Response {
    let cookie = set_cookie_header(&config.refresh_cookie(), &pair.refresh_token);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        axum::Json(AccessTokenResponse {
            access_token: pair.access_token,
        }),
    )
        .into_response()
}

// ============================================================================
// Session
// ============================================================================

/// POST /auth/login
pub async fn login<R, M>(
    State(state): State<AuthAppState<R, M>>,
    ClientMeta(client): ClientMeta,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Response>
where
    R: AuthStore,
    M: Mailer,
{
    let use_case = LoginUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.tokens.clone(),
        state.config.clone(),
    );

    let input = LoginInput {
        login_or_email: req.login_or_email,
        password: req.password,
    };
    let pair = use_case.execute(input, client).await?;

    Ok(token_response(&state.config, pair))
}

/// POST /auth/refresh-token
pub async fn refresh_token<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Extension(ctx): Extension<RefreshContext>,
) -> AuthResult<Response>
where
    R: AuthStore,
    M: Mailer,
{
    let use_case =
        RefreshTokenUseCase::new(state.repo.clone(), state.tokens.clone(), state.config.clone());
    let pair = use_case.execute(&ctx).await?;

    Ok(token_response(&state.config, pair))
}

/// POST /auth/logout
pub async fn logout<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Extension(ctx): Extension<RefreshContext>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: Mailer,
{
    LogoutUseCase::new(state.repo.clone()).execute(&ctx).await?;

    let cookie = delete_cookie_header(&state.config.refresh_cookie());
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

/// GET /auth/me
pub async fn me<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Extension(current): Extension<CurrentUser>,
) -> AuthResult<axum::Json<MeView>>
where
    R: AuthStore,
    M: Mailer,
{
    // A valid token for a deleted user is as good as no token
    let view = state
        .repo
        .find_me_view(&current.user_id)
        .await?
        .ok_or(AuthError::AccessTokenInvalid)?;

    Ok(axum::Json(view))
}

// ============================================================================
// Registration
// ============================================================================

/// POST /auth/registration
pub async fn registration<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<NewUserRequest>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    M: Mailer,
{
    let use_case =
        RegisterUseCase::new(state.repo.clone(), state.mailer.clone(), state.config.clone());
    use_case
        .execute(NewUserInput {
            login: req.login,
            password: req.password,
            email: req.email,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /auth/registration-confirmation
pub async fn registration_confirmation<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<CodeRequest>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    M: Mailer,
{
    ConfirmRegistrationUseCase::new(state.repo.clone())
        .execute(&req.code)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /auth/registration-email-resending
pub async fn registration_email_resending<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<EmailRequest>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    M: Mailer,
{
    let use_case = ResendConfirmationUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );
    use_case.execute(req.email).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Password recovery
// ============================================================================

/// POST /auth/password-recovery
pub async fn password_recovery<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<EmailRequest>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    M: Mailer,
{
    let use_case = PasswordRecoveryUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );
    use_case.execute(req.email).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /auth/new-password
pub async fn new_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<NewPasswordRequest>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    M: Mailer,
{
    NewPasswordUseCase::new(state.repo.clone(), state.config.clone())
        .execute(NewPasswordInput {
            new_password: req.new_password,
            recovery_code: req.recovery_code,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Security devices
// ============================================================================

/// GET /security/devices
pub async fn list_devices<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Extension(ctx): Extension<RefreshContext>,
) -> AuthResult<axum::Json<Vec<DeviceView>>>
where
    R: AuthStore,
    M: Mailer,
{
    let devices = DevicesUseCase::new(state.repo.clone()).list(&ctx).await?;
    Ok(axum::Json(devices))
}

/// DELETE /security/devices
pub async fn terminate_other_devices<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Extension(ctx): Extension<RefreshContext>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    M: Mailer,
{
    DevicesUseCase::new(state.repo.clone())
        .terminate_others(&ctx)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /security/devices/{deviceId}
pub async fn terminate_device<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Extension(ctx): Extension<RefreshContext>,
    Path(device_id): Path<String>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    M: Mailer,
{
    DevicesUseCase::new(state.repo.clone())
        .terminate(&ctx, &device_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Users (admin)
// ============================================================================

/// GET /sa/users
pub async fn list_users<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Query(query): Query<UsersQuery>,
) -> AuthResult<axum::Json<Paginated<UserView>>>
where
    R: AuthStore,
    M: Mailer,
{
    let page = query.page.resolve(USER_SORT_COLUMNS);
    let filter = UserFilter {
        search_login_term: query.search_login_term.filter(|t| !t.is_empty()),
        search_email_term: query.search_email_term.filter(|t| !t.is_empty()),
    };

    let users = state.repo.list_users(&filter, &page).await?;
    Ok(axum::Json(users))
}

/// POST /sa/users
pub async fn create_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<NewUserRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: Mailer,
{
    let view = CreateUserUseCase::new(state.repo.clone(), state.config.clone())
        .execute(NewUserInput {
            login: req.login,
            password: req.password,
            email: req.email,
        })
        .await?;

    Ok((StatusCode::CREATED, axum::Json(view)))
}

/// DELETE /sa/users/{id}
pub async fn delete_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Path(user_id): Path<String>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    M: Mailer,
{
    DeleteUserUseCase::new(state.repo.clone())
        .execute(&user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
