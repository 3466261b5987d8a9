//! Auth Middleware
//!
//! Guards run via `from_fn_with_state` and put the authenticated principal
//! into request extensions for handlers to pick up.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, FromRequestParts, Request, State};
use axum::http::{HeaderMap, header, request::Parts};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;
use kernel::id::UserId;
use platform::client::{ClientInfo, extract_client_info, extract_client_ip};
use platform::rate_limit::{InMemoryRateLimitStore, RateLimitConfig, RateLimitStore};

use crate::application::check_session::CheckSessionUseCase;
use crate::application::config::AuthConfig;
use crate::application::token::TokenService;
use crate::error::AuthError;
use crate::presentation::handlers::{AuthAppState, AuthStore, Mailer};

/// Authenticated user behind a bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: UserId,
}

/// Optional bearer identity for public read endpoints; `None` is anonymous
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer(pub Option<UserId>);

/// State for the stateless guards (bearer and admin Basic)
#[derive(Clone)]
pub struct AccessGuard {
    pub tokens: Arc<TokenService>,
    pub config: Arc<AuthConfig>,
}

impl AccessGuard {
    pub fn new(tokens: Arc<TokenService>, config: Arc<AuthConfig>) -> Self {
        Self { tokens, config }
    }

    fn bearer_user(&self, headers: &HeaderMap) -> Option<UserId> {
        let token = authorization(headers, "Bearer")?;
        self.tokens.verify_access(token).ok()
    }
}

/// Value of `Authorization: <scheme> <value>`, scheme matched case-insensitively
fn authorization<'a>(headers: &'a HeaderMap, scheme: &str) -> Option<&'a str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (given, rest) = value.trim().split_once(' ')?;
    given
        .eq_ignore_ascii_case(scheme)
        .then(|| rest.trim())
        .filter(|rest| !rest.is_empty())
}

/// Rejects requests without a valid access token
pub async fn require_bearer(
    State(guard): State<AccessGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user_id = guard
        .bearer_user(req.headers())
        .ok_or(AuthError::AccessTokenInvalid)?;

    req.extensions_mut().insert(CurrentUser { user_id });
    Ok(next.run(req).await)
}

/// Resolves the viewer if a valid access token is present; never rejects
pub async fn identify_bearer(
    State(guard): State<AccessGuard>,
    mut req: Request,
    next: Next,
) -> Response {
    let viewer = Viewer(guard.bearer_user(req.headers()));
    req.extensions_mut().insert(viewer);
    next.run(req).await
}

/// HTTP Basic check against the configured admin credentials
pub async fn require_basic_admin(
    State(guard): State<AccessGuard>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let credentials = authorization(req.headers(), "Basic")
        .and_then(|encoded| platform::crypto::from_base64(encoded).ok())
        .and_then(|decoded| String::from_utf8(decoded).ok());

    let authorized = credentials
        .as_deref()
        .and_then(|pair| pair.split_once(':'))
        .is_some_and(|(login, password)| guard.config.admin.matches(login, password));

    if !authorized {
        return Err(AuthError::AdminCredentialsInvalid);
    }
    Ok(next.run(req).await)
}

/// Requires a refresh-token cookie that is the current token of a live
/// device session; inserts the [`RefreshContext`](crate::application::RefreshContext)
pub async fn require_refresh_session<R, M>(
    State(state): State<AuthAppState<R, M>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    R: AuthStore,
    M: Mailer,
{
    let token = platform::cookie::extract_cookie(req.headers(), &state.config.refresh_cookie_name)
        .ok_or(AuthError::SessionInvalid)?;

    let ctx = CheckSessionUseCase::new(state.repo.clone(), state.tokens.clone())
        .execute(&token)
        .await?;

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

// ============================================================================
// Rate limiting
// ============================================================================

#[derive(Clone)]
pub struct RateLimiter {
    pub store: Arc<InMemoryRateLimitStore>,
    pub config: RateLimitConfig,
    pub trust_forwarded_for: bool,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, trust_forwarded_for: bool) -> Self {
        Self {
            store: Arc::new(InMemoryRateLimitStore::new()),
            config,
            trust_forwarded_for,
        }
    }
}

fn peer_ip(extensions: &axum::http::Extensions) -> Option<std::net::IpAddr> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
}

/// Fixed-window limit per client IP and route
pub async fn rate_limit(State(limiter): State<RateLimiter>, req: Request, next: Next) -> Response {
    let direct_ip = peer_ip(req.extensions());
    let ip = extract_client_ip(req.headers(), direct_ip, limiter.trust_forwarded_for)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let key = format!("{}:{}", ip, req.uri().path());

    match limiter.store.check_and_increment(&key, &limiter.config).await {
        Ok(result) if !result.allowed => {
            tracing::warn!(key = %key, "Rate limit exceeded");
            return AppError::too_many_requests("Too many requests")
                .with_action(format!(
                    "Retry in {} seconds",
                    result.reset_after.as_secs().max(1)
                ))
                .into_response();
        }
        Ok(_) => {}
        // Limiter trouble must not take the endpoints down
        Err(e) => tracing::warn!(error = %e, "Rate limiter unavailable"),
    }

    next.run(req).await
}

// ============================================================================
// Client info extractor
// ============================================================================

/// IP and device name of the caller
pub struct ClientMeta(pub ClientInfo);

impl<R, M> FromRequestParts<AuthAppState<R, M>> for ClientMeta
where
    R: AuthStore,
    M: Mailer,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AuthAppState<R, M>,
    ) -> Result<Self, Self::Rejection> {
        let direct_ip = peer_ip(&parts.extensions);
        Ok(Self(extract_client_info(
            &parts.headers,
            direct_ip,
            state.config.trust_forwarded_for,
        )))
    }
}
